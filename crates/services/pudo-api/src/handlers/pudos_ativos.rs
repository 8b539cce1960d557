//! Active points handler

use axum::{Json, extract::State};
use presto_client::ResultSet;
use queries::catalog::PUDOS_ATIVOS;

use crate::{ctx::Ctx, handlers::common, handlers::error::ErrorResponse};

/// Handler for the `GET /api/pudos-ativos` endpoint
///
/// Returns every active pickup/drop-off point with its state and city.
///
/// ## Response
/// - **200 OK**: JSON array of `{dop_id, estado, cidade}` objects
/// - **502 Bad Gateway**: The engine was unreachable or failed the query
/// - **504 Gateway Timeout**: The engine did not answer in time
///
/// ## Error Codes
/// - `ENGINE_CONNECT_ERROR`, `ENGINE_SUBMIT_ERROR`, `ENGINE_REJECTED_QUERY`,
///   `ENGINE_TRANSPORT_ERROR`, `ENGINE_TIMEOUT`
#[tracing::instrument(skip_all, err)]
pub async fn handler(State(ctx): State<Ctx>) -> Result<Json<ResultSet>, ErrorResponse> {
    common::run_catalog_query(&ctx, PUDOS_ATIVOS)
        .await
        .map(Json)
        .map_err(|err| ErrorResponse::new(err, ctx.environment))
}
