//! Analytical query catalog and filter composition.
//!
//! The [`QueryCatalog`] holds the fixed set of named base queries served by the API. The
//! [`compose`] function wraps one of them as a derived table and restricts it to the active
//! pickup/drop-off points matching a [`FilterSet`], producing a [`ComposedQuery`] whose
//! caller-supplied values travel only as bound parameters.

pub mod catalog;
pub mod compose;
pub mod filter;
mod templates;

pub use self::{
    catalog::{CatalogError, QueryCatalog, QueryDefinition, QueryName, QueryNotFoundError},
    compose::{ComposeError, ComposedQuery, Predicate, compose},
    filter::{DataType, FieldFilter, FilterSet, InvalidDataTypeError, InvalidFilterError},
};

/// Fully qualified name of the active pickup/drop-off points dimension table.
pub const DIMENSION_TABLE: &str = "dev_brbi_opslgc.pudos_active_br_us_v1";

/// Column joining computed metrics to the dimension table.
pub const JOIN_KEY: &str = "dop_id";
