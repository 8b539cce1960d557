//! Shared execution path for query-backed handlers

use std::time::Duration;

use axum::http::StatusCode;
use monitoring::logging;
use presto_client::{ExecutionError, Phase, ResultSet};
use queries::{QueryName, QueryNotFoundError};

use crate::{ctx::Ctx, handlers::error::IntoErrorResponse};

/// Runs the catalog entry `name` unchanged.
pub async fn run_catalog_query(ctx: &Ctx, name: QueryName) -> Result<ResultSet, QueryError> {
    let definition = ctx.catalog.lookup(name).map_err(QueryError::NotFound)?;
    let expected_columns: Vec<String> = definition
        .expected_columns()
        .iter()
        .map(|column| column.to_string())
        .collect();

    run_statement(ctx, definition.template(), &[], &expected_columns).await
}

/// Sends a statement through the gateway, bounded by the configured query timeout.
///
/// When the timeout elapses the gateway call is dropped, which cancels the engine query.
pub async fn run_statement(
    ctx: &Ctx,
    sql: &str,
    params: &[String],
    expected_columns: &[String],
) -> Result<ResultSet, QueryError> {
    let execution = ctx.gateway.execute(sql, params, expected_columns);
    let result = match ctx.query_timeout {
        Some(timeout) => match tokio::time::timeout(timeout, execution).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?timeout, "engine query timed out");
                return Err(QueryError::QueryTimeout { timeout });
            }
        },
        None => execution.await,
    };

    result.map_err(|err| {
        tracing::error!(
            phase = %err.phase(),
            error = %err,
            error_source = logging::error_source(&err),
            "engine query failed"
        );
        QueryError::from(err)
    })
}

/// Errors that can occur while running a query on behalf of a request
///
/// The messages are deliberately generic; the engine-side message is kept in the source
/// chain and only reaches callers as `details` outside production.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The requested query is not in the catalog
    #[error(transparent)]
    NotFound(QueryNotFoundError),

    /// No session with the engine could be established
    ///
    /// This occurs when:
    /// - The coordinator is unreachable or refuses the connection
    /// - The configured credentials are rejected
    #[error("failed to connect to the analytics engine")]
    EngineConnect(#[source] ExecutionError),

    /// The coordinator refused the statement submission
    #[error("failed to submit query to the analytics engine")]
    EngineSubmit(#[source] ExecutionError),

    /// The engine accepted and then failed the statement
    ///
    /// This occurs when the statement has a syntax error, references unknown objects, or
    /// the user lacks permissions. For composed queries it points to a composition bug.
    #[error("the analytics engine rejected the query")]
    EngineRejected(#[source] ExecutionError),

    /// The exchange with the engine broke down after submission
    #[error("failed to fetch data from the analytics engine")]
    EngineTransport(#[source] ExecutionError),

    /// The HTTP client timed out while talking to the engine
    #[error("the analytics engine did not respond in time")]
    EngineTimeout(#[source] ExecutionError),

    /// The configured query timeout elapsed before the engine finished
    #[error("the analytics engine did not respond within {timeout:?}")]
    QueryTimeout { timeout: Duration },
}

impl From<ExecutionError> for QueryError {
    fn from(err: ExecutionError) -> Self {
        match err.phase() {
            Phase::Connect => QueryError::EngineConnect(err),
            Phase::Submit => QueryError::EngineSubmit(err),
            Phase::EngineReject => QueryError::EngineRejected(err),
            Phase::Transport if err.is_timeout() => QueryError::EngineTimeout(err),
            Phase::Transport => QueryError::EngineTransport(err),
        }
    }
}

impl IntoErrorResponse for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            QueryError::NotFound(_) => "QUERY_NOT_FOUND",
            QueryError::EngineConnect(_) => "ENGINE_CONNECT_ERROR",
            QueryError::EngineSubmit(_) => "ENGINE_SUBMIT_ERROR",
            QueryError::EngineRejected(_) => "ENGINE_REJECTED_QUERY",
            QueryError::EngineTransport(_) => "ENGINE_TRANSPORT_ERROR",
            QueryError::EngineTimeout(_) | QueryError::QueryTimeout { .. } => "ENGINE_TIMEOUT",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            QueryError::NotFound(_) => StatusCode::BAD_REQUEST,
            QueryError::EngineConnect(_)
            | QueryError::EngineRejected(_)
            | QueryError::EngineTransport(_) => StatusCode::BAD_GATEWAY,
            QueryError::EngineTimeout(_) | QueryError::QueryTimeout { .. } => {
                StatusCode::GATEWAY_TIMEOUT
            }
            QueryError::EngineSubmit(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
