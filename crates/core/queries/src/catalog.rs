//! Named base query definitions.
//!
//! The catalog is built once at process start and never mutated afterwards, so a shared
//! reference can be read from any number of request tasks without synchronization.

use std::collections::BTreeMap;

use crate::templates;

/// Catalog name of the active pickup/drop-off points query.
pub const PUDOS_ATIVOS: &str = "pudosAtivos";

/// Catalog name of the 28-day rolling history query.
pub const RECENT_HISTORY: &str = "recentHistory";

/// Catalog name of the live backlog query.
pub const LIVE_DATA: &str = "liveData";

/// Catalog key of a query definition.
pub type QueryName = &'static str;

/// An immutable, named base query.
///
/// `expected_columns` documents the output schema of the template. It is advisory: the
/// engine's reported column list is authoritative for every executed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefinition {
    name: QueryName,
    template: &'static str,
    expected_columns: &'static [&'static str],
}

impl QueryDefinition {
    pub const fn new(
        name: QueryName,
        template: &'static str,
        expected_columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            template,
            expected_columns,
        }
    }

    pub fn name(&self) -> QueryName {
        self.name
    }

    /// The query text, without surrounding whitespace.
    pub fn template(&self) -> &'static str {
        self.template.trim()
    }

    /// Output columns the template is documented to produce. Empty means "infer from engine".
    pub fn expected_columns(&self) -> &'static [&'static str] {
        self.expected_columns
    }
}

/// Read-only mapping from query name to [`QueryDefinition`].
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    entries: BTreeMap<QueryName, QueryDefinition>,
}

impl QueryCatalog {
    /// Builds a catalog from the given definitions.
    ///
    /// Names must be unique. Templates must not contain `?` since that character is reserved
    /// for the positional parameter markers added by the compositor.
    pub fn new(
        definitions: impl IntoIterator<Item = QueryDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();
        for definition in definitions {
            if definition.template.contains('?') {
                return Err(CatalogError::PlaceholderInTemplate {
                    name: definition.name,
                });
            }
            if entries.contains_key(definition.name) {
                return Err(CatalogError::DuplicateName {
                    name: definition.name,
                });
            }
            entries.insert(definition.name, definition);
        }
        Ok(Self { entries })
    }

    /// The catalog of queries served by the API.
    pub fn builtin() -> Self {
        Self::new([
            QueryDefinition::new(
                PUDOS_ATIVOS,
                templates::PUDOS_ATIVOS,
                &["dop_id", "estado", "cidade"],
            ),
            QueryDefinition::new(
                RECENT_HISTORY,
                templates::RECENT_HISTORY,
                &[
                    "dop_id",
                    "max_event_time",
                    "max_cumulative_volume",
                    "count_p",
                    "count_m",
                    "count_g",
                    "count_gg",
                    "total_count",
                ],
            ),
            QueryDefinition::new(
                LIVE_DATA,
                templates::LIVE_DATA,
                &[
                    "dop_id",
                    "max_cumulative_volume",
                    "n_shipments",
                    "current_cumulative_volume",
                ],
            ),
        ])
        .expect("builtin query catalog is valid")
    }

    /// Looks up a query definition by name.
    pub fn lookup(&self, name: &str) -> Result<&QueryDefinition, QueryNotFoundError> {
        self.entries.get(name).ok_or_else(|| QueryNotFoundError {
            name: name.to_string(),
        })
    }
}

/// No query with the requested name exists in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("query '{name}' not found in catalog")]
pub struct QueryNotFoundError {
    pub name: String,
}

/// Errors that can occur when building a [`QueryCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two definitions share the same name.
    #[error("duplicate query name '{name}'")]
    DuplicateName { name: QueryName },

    /// A template contains the reserved `?` parameter marker.
    #[error("query '{name}' template contains a '?' parameter marker")]
    PlaceholderInTemplate { name: QueryName },
}
