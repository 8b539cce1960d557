//! Filtered query handler

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use presto_client::ResultSet;
use queries::{ComposeError, DataType, FilterSet, InvalidDataTypeError, InvalidFilterError};

use crate::{
    ctx::Ctx,
    handlers::{
        common::{self, QueryError},
        error::{ErrorResponse, IntoErrorResponse},
    },
};

/// Query string of `GET /api/filter`
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub data_type: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub dop_id: Option<String>,
}

/// Handler for the `GET /api/filter` endpoint
///
/// Runs the base query selected by `dataType` restricted to the points matching the
/// `state`, `city` and `dopId` filters. Each row carries the point's `estado` and
/// `cidade` in addition to the base query columns.
///
/// ## Query Parameters
/// - `dataType`: `recent-history` or `live` (required)
/// - `state`, `city`, `dopId`: exact match on the point attribute; absent, empty or `All`
///   means no restriction
///
/// ## Response
/// - **200 OK**: JSON array of row objects
/// - **400 Bad Request**: Invalid data type, filter value or query string
/// - **500 Internal Server Error**: The engine refused the statement submission
/// - **502 Bad Gateway**: The engine was unreachable or failed the query
/// - **504 Gateway Timeout**: The engine did not answer in time
///
/// ## Error Codes
/// - `INVALID_QUERY_PARAMS`: The query string could not be parsed
/// - `INVALID_DATA_TYPE`: `dataType` is missing or not a known data type
/// - `INVALID_FILTER`: A filter value is too long or contains control characters
/// - `QUERY_NOT_FOUND`: The base query for the data type is missing
/// - `ENGINE_*`: See [`QueryError`]
#[tracing::instrument(skip_all, err)]
pub async fn handler(
    State(ctx): State<Ctx>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<ResultSet>, ErrorResponse> {
    let environment = ctx.environment;
    run(&ctx, query)
        .await
        .map(Json)
        .map_err(|err| ErrorResponse::new(err, environment))
}

async fn run(
    ctx: &Ctx,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> Result<ResultSet, Error> {
    let params = match query {
        Ok(Query(params)) => params,
        Err(err) => {
            tracing::debug!(error = %err, "invalid filter query string");
            return Err(Error::InvalidQueryParams(err));
        }
    };

    let data_type: DataType = params
        .data_type
        .as_deref()
        .ok_or(Error::MissingDataType)?
        .parse()
        .map_err(Error::InvalidDataType)?;
    let filters = FilterSet::parse(
        data_type,
        params.state.as_deref(),
        params.city.as_deref(),
        params.dop_id.as_deref(),
    )
    .map_err(Error::InvalidFilter)?;

    let composed = queries::compose(&ctx.catalog, &filters).map_err(Error::Compose)?;
    tracing::debug!(
        base = composed.base(),
        predicates = composed.predicates().len(),
        "composed filtered query"
    );

    common::run_statement(
        ctx,
        composed.sql(),
        composed.params(),
        composed.expected_columns(),
    )
    .await
    .map_err(Error::Query)
}

/// Errors that can occur while handling a `GET /api/filter` request
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The query string could not be deserialized
    ///
    /// This occurs when a parameter is repeated or the query string is not valid
    /// `application/x-www-form-urlencoded`.
    #[error("invalid query parameters")]
    InvalidQueryParams(#[source] QueryRejection),

    /// `dataType` was not provided
    #[error("missing data type, expected one of: recent-history, live")]
    MissingDataType,

    /// `dataType` is not one of the known data types
    #[error(transparent)]
    InvalidDataType(InvalidDataTypeError),

    /// A filter value failed validation
    #[error(transparent)]
    InvalidFilter(InvalidFilterError),

    /// The base query for the data type is missing from the catalog
    #[error("base query not found")]
    Compose(#[source] ComposeError),

    /// Running the composed query failed
    #[error(transparent)]
    Query(QueryError),
}

impl IntoErrorResponse for Error {
    fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidQueryParams(_) => "INVALID_QUERY_PARAMS",
            Error::MissingDataType | Error::InvalidDataType(_) => "INVALID_DATA_TYPE",
            Error::InvalidFilter(_) => "INVALID_FILTER",
            Error::Compose(_) => "QUERY_NOT_FOUND",
            Error::Query(err) => err.error_code(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidQueryParams(_)
            | Error::MissingDataType
            | Error::InvalidDataType(_)
            | Error::InvalidFilter(_)
            | Error::Compose(_) => StatusCode::BAD_REQUEST,
            Error::Query(err) => err.status_code(),
        }
    }
}
