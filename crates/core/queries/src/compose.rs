//! Filter composition over catalog queries.
//!
//! A composed query wraps a base query as the `filtered_data` derived table and joins it
//! against the active points dimension table, restricted by one equality predicate per
//! concrete filter value:
//!
//! ```text
//! WITH filtered_data AS (
//!   <base query>
//! ),
//! pudos_active AS (
//!   SELECT dop_id, estado, cidade
//!   FROM <dimension table>
//!   WHERE estado = ?
//!     AND cidade = ?
//! )
//! SELECT fd.*, pa.estado, pa.cidade
//! FROM filtered_data fd
//! JOIN pudos_active pa ON fd.dop_id = pa.dop_id
//! ```
//!
//! Filter values never appear in the statement text. Each one is a `?` marker in the text
//! and an entry in [`ComposedQuery::params`], in `state`, `city`, `dopId` order.

use std::fmt::Write as _;

use crate::{
    DIMENSION_TABLE, JOIN_KEY,
    catalog::{QueryCatalog, QueryDefinition, QueryName, QueryNotFoundError},
    filter::{FieldFilter, FilterSet},
};

/// Dimension attributes appended to the base query's columns.
pub const DIMENSION_COLUMNS: [&str; 2] = ["estado", "cidade"];

/// An equality restriction on a dimension table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    /// Request field the value came from.
    pub field: &'static str,
    /// Dimension table column compared against the bound value.
    pub column: &'static str,
}

/// A single-use statement built from a base query and a [`FilterSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedQuery {
    base: QueryName,
    sql: String,
    predicates: Vec<Predicate>,
    params: Vec<String>,
    expected_columns: Vec<String>,
}

impl ComposedQuery {
    /// Wraps `base` and restricts it by the concrete values in `filters`.
    ///
    /// Performs no lookups or I/O; the output depends only on the template text and the
    /// filter values.
    pub fn wrap(base: &QueryDefinition, filters: &FilterSet) -> Self {
        let candidates: [(&'static str, &'static str, &FieldFilter); 3] = [
            ("state", "estado", &filters.state),
            ("city", "cidade", &filters.city),
            ("dopId", JOIN_KEY, &filters.dop_id),
        ];

        let mut predicates = Vec::new();
        let mut params = Vec::new();
        for (field, column, filter) in candidates {
            if let Some(value) = filter.value() {
                predicates.push(Predicate { field, column });
                params.push(value.to_string());
            }
        }

        let mut sql = String::from("WITH filtered_data AS (\n");
        for line in base.template().lines() {
            if line.trim().is_empty() {
                sql.push('\n');
            } else {
                let _ = writeln!(sql, "  {line}");
            }
        }
        sql.push_str("),\npudos_active AS (\n");
        let _ = writeln!(sql, "  SELECT {JOIN_KEY}, estado, cidade");
        let _ = writeln!(sql, "  FROM {DIMENSION_TABLE}");
        for (idx, predicate) in predicates.iter().enumerate() {
            let keyword = if idx == 0 { "  WHERE" } else { "    AND" };
            let _ = writeln!(sql, "{keyword} {} = ?", predicate.column);
        }
        sql.push_str(")\n");
        sql.push_str("SELECT fd.*, pa.estado, pa.cidade\n");
        sql.push_str("FROM filtered_data fd\n");
        let _ = write!(
            sql,
            "JOIN pudos_active pa ON fd.{JOIN_KEY} = pa.{JOIN_KEY}"
        );

        let expected_columns = base
            .expected_columns()
            .iter()
            .chain(DIMENSION_COLUMNS.iter())
            .map(|column| column.to_string())
            .collect();

        Self {
            base: base.name(),
            sql,
            predicates,
            params,
            expected_columns,
        }
    }

    /// Name of the catalog query wrapped as `filtered_data`.
    pub fn base(&self) -> QueryName {
        self.base
    }

    /// Statement text with one `?` marker per predicate.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Bound parameter values, positionally matching the `?` markers.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Base query columns followed by the dimension attributes.
    pub fn expected_columns(&self) -> &[String] {
        &self.expected_columns
    }
}

/// Builds the composed query for `filters`, selecting the base query by data type.
pub fn compose(catalog: &QueryCatalog, filters: &FilterSet) -> Result<ComposedQuery, ComposeError> {
    let base = catalog.lookup(filters.data_type.query_name())?;
    Ok(ComposedQuery::wrap(base, filters))
}

/// Errors that can occur while composing a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    /// The base query selected by the data type is missing from the catalog.
    #[error("base query unavailable")]
    BaseQueryNotFound(#[from] QueryNotFoundError),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_str_eq;
    use sqlparser::{dialect::GenericDialect, parser::Parser};

    use super::*;
    use crate::{
        catalog::{LIVE_DATA, RECENT_HISTORY},
        filter::DataType,
    };

    fn metrics_catalog() -> QueryCatalog {
        QueryCatalog::new([
            QueryDefinition::new(
                RECENT_HISTORY,
                "SELECT dop_id, total_count\nFROM history",
                &["dop_id", "total_count"],
            ),
            QueryDefinition::new(LIVE_DATA, "SELECT dop_id, n_shipments FROM backlog", &[]),
        ])
        .expect("valid catalog")
    }

    fn equals(value: &str) -> FieldFilter {
        FieldFilter::Equals(value.to_string())
    }

    #[test]
    fn unrestricted_filters_compose_unconditional_join() {
        //* Given
        let catalog = metrics_catalog();
        let filters = FilterSet::unrestricted(DataType::RecentHistory);

        //* When
        let composed = compose(&catalog, &filters).expect("compose");

        //* Then
        assert!(composed.predicates().is_empty());
        assert!(composed.params().is_empty());
        assert_str_eq!(
            composed.sql(),
            indoc::indoc! {"
                WITH filtered_data AS (
                  SELECT dop_id, total_count
                  FROM history
                ),
                pudos_active AS (
                  SELECT dop_id, estado, cidade
                  FROM dev_brbi_opslgc.pudos_active_br_us_v1
                )
                SELECT fd.*, pa.estado, pa.cidade
                FROM filtered_data fd
                JOIN pudos_active pa ON fd.dop_id = pa.dop_id"}
        );
    }

    #[test]
    fn predicates_follow_state_city_dop_id_order() {
        //* Given
        let catalog = metrics_catalog();
        let filters = FilterSet {
            data_type: DataType::Live,
            dop_id: equals("BR123"),
            city: equals("Campinas"),
            state: equals("SP"),
        };

        //* When
        let composed = compose(&catalog, &filters).expect("compose");

        //* Then
        assert_eq!(composed.base(), LIVE_DATA);
        assert_eq!(composed.params(), &["SP", "Campinas", "BR123"]);
        assert_eq!(
            composed
                .predicates()
                .iter()
                .map(|p| p.column)
                .collect::<Vec<_>>(),
            vec!["estado", "cidade", "dop_id"]
        );
        assert_str_eq!(
            composed.sql(),
            indoc::indoc! {"
                WITH filtered_data AS (
                  SELECT dop_id, n_shipments FROM backlog
                ),
                pudos_active AS (
                  SELECT dop_id, estado, cidade
                  FROM dev_brbi_opslgc.pudos_active_br_us_v1
                  WHERE estado = ?
                    AND cidade = ?
                    AND dop_id = ?
                )
                SELECT fd.*, pa.estado, pa.cidade
                FROM filtered_data fd
                JOIN pudos_active pa ON fd.dop_id = pa.dop_id"}
        );
    }

    #[test]
    fn single_state_filter_binds_one_predicate() {
        let catalog = metrics_catalog();
        let mut filters = FilterSet::unrestricted(DataType::Live);
        filters.state = equals("SP");

        let composed = compose(&catalog, &filters).expect("compose");

        assert_eq!(
            composed.predicates(),
            &[Predicate {
                field: "state",
                column: "estado"
            }]
        );
        assert_eq!(composed.params(), &["SP"]);
        assert_eq!(composed.sql().matches('?').count(), 1);
    }

    #[test]
    fn filter_values_never_reach_statement_text() {
        //* Given
        let catalog = metrics_catalog();
        let hostile = "SP' OR '1'='1";
        let filters = FilterSet {
            data_type: DataType::RecentHistory,
            state: equals(hostile),
            city: equals("x); DROP TABLE t; --"),
            dop_id: equals("zz_unique_marker"),
        };

        //* When
        let composed = compose(&catalog, &filters).expect("compose");

        //* Then
        for value in composed.params() {
            assert!(!composed.sql().contains(value.as_str()));
        }
        assert_eq!(composed.sql().matches('?').count(), composed.params().len());
    }

    #[test]
    fn data_type_selects_base_query() {
        let catalog = QueryCatalog::builtin();

        let history = compose(&catalog, &FilterSet::unrestricted(DataType::RecentHistory))
            .expect("compose");
        let live = compose(&catalog, &FilterSet::unrestricted(DataType::Live)).expect("compose");

        assert_eq!(history.base(), RECENT_HISTORY);
        assert!(history.sql().contains("classified_shipments"));
        assert_eq!(live.base(), LIVE_DATA);
        assert!(live.sql().contains("shipments_in_backlog"));
    }

    #[test]
    fn expected_columns_append_dimension_attributes() {
        let catalog = metrics_catalog();

        let composed = compose(&catalog, &FilterSet::unrestricted(DataType::RecentHistory))
            .expect("compose");

        assert_eq!(
            composed.expected_columns(),
            &["dop_id", "total_count", "estado", "cidade"]
        );
    }

    #[test]
    fn missing_base_query_is_reported() {
        let catalog = QueryCatalog::new([QueryDefinition::new(
            RECENT_HISTORY,
            "SELECT dop_id FROM history",
            &[],
        )])
        .expect("valid catalog");

        let result = compose(&catalog, &FilterSet::unrestricted(DataType::Live));

        assert_eq!(
            result,
            Err(ComposeError::BaseQueryNotFound(QueryNotFoundError {
                name: LIVE_DATA.to_string()
            }))
        );
    }

    #[test]
    fn composing_is_deterministic() {
        let catalog = QueryCatalog::builtin();
        let filters = FilterSet::parse(DataType::Live, Some("RJ"), Some("All"), Some("D1"))
            .expect("valid filters");

        let first = compose(&catalog, &filters).expect("compose");
        let second = compose(&catalog, &filters).expect("compose");

        assert_eq!(first, second);
    }

    #[test]
    fn composed_statement_parses_as_sql() {
        let catalog = metrics_catalog();
        let filters = FilterSet::parse(DataType::Live, Some("SP"), Some("Santos"), None)
            .expect("valid filters");

        let composed = compose(&catalog, &filters).expect("compose");
        let statements =
            Parser::parse_sql(&GenericDialect {}, composed.sql()).expect("composed SQL parses");

        assert_eq!(statements.len(), 1);
    }
}
