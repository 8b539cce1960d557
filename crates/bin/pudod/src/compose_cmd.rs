use queries::{
    ComposeError, DataType, FilterSet, InvalidDataTypeError, InvalidFilterError, QueryCatalog,
};

/// Composes the filtered query against the built-in catalog and renders it as JSON.
pub fn run(
    data_type: &str,
    state: Option<&str>,
    city: Option<&str>,
    dop_id: Option<&str>,
) -> Result<String, Error> {
    let data_type: DataType = data_type.parse().map_err(Error::InvalidDataType)?;
    let filters = FilterSet::parse(data_type, state, city, dop_id).map_err(Error::InvalidFilter)?;

    let catalog = QueryCatalog::builtin();
    let composed = queries::compose(&catalog, &filters).map_err(Error::Compose)?;

    let output = serde_json::json!({
        "data_type": data_type,
        "base": composed.base(),
        "sql": composed.sql(),
        "params": composed.params(),
        "expected_columns": composed.expected_columns(),
    });
    serde_json::to_string_pretty(&output).map_err(Error::Render)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidDataType(InvalidDataTypeError),

    #[error(transparent)]
    InvalidFilter(InvalidFilterError),

    #[error(transparent)]
    Compose(ComposeError),

    #[error("failed to render output: {0}")]
    Render(#[source] serde_json::Error),
}
