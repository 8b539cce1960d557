//! Presto client used as the execution gateway of the metrics service.
//!
//! A [`Client`] submits one statement per call over the Presto client REST protocol,
//! follows the result pages to completion and returns the rows as a [`ResultSet`]. Failures
//! are reported as an [`ExecutionError`] classified by the [`Phase`] in which they occurred.
//! The client keeps no state between calls besides its HTTP connection pool.

mod client;
pub mod error;
pub mod params;
mod protocol;
pub mod result_set;

pub use self::{
    client::{BuildClientError, Client},
    error::{ExecutionError, Phase},
    result_set::{ArityError, ResultSet},
};

/// Name under which parameterized statements are prepared for a single request.
pub const PREPARED_STATEMENT_NAME: &str = "pudo_query";
