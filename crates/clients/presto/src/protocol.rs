//! Wire types of the Presto client REST protocol (`/v1/statement`).

pub const STATEMENT_PATH: &str = "v1/statement";

pub const HEADER_USER: &str = "X-Presto-User";
pub const HEADER_SOURCE: &str = "X-Presto-Source";
pub const HEADER_CATALOG: &str = "X-Presto-Catalog";
pub const HEADER_SCHEMA: &str = "X-Presto-Schema";
pub const HEADER_PREPARED_STATEMENT: &str = "X-Presto-Prepared-Statement";

/// One page of query results.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub id: String,
    pub next_uri: Option<String>,
    pub columns: Option<Vec<Column>>,
    pub data: Option<Vec<Vec<serde_json::Value>>>,
    pub stats: Option<StatementStats>,
    pub error: Option<QueryError>,
}

#[derive(Debug, serde::Deserialize)]
pub struct Column {
    pub name: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct StatementStats {
    pub state: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    pub message: String,
    pub error_name: Option<String>,
    pub error_type: Option<String>,
}
