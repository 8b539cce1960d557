//! Live data handler

use axum::{Json, extract::State};
use presto_client::ResultSet;
use queries::catalog::LIVE_DATA;

use crate::{ctx::Ctx, handlers::common, handlers::error::ErrorResponse};

/// Handler for the `GET /api/live-data` endpoint
///
/// Returns one row per point describing its current backlog.
///
/// ## Columns
/// - `n_shipments`: shipments currently held at the point
/// - `current_cumulative_volume`: volume stored right now
/// - `max_cumulative_volume`: peak stored volume over the backlog window
#[tracing::instrument(skip_all, err)]
pub async fn handler(State(ctx): State<Ctx>) -> Result<Json<ResultSet>, ErrorResponse> {
    common::run_catalog_query(&ctx, LIVE_DATA)
        .await
        .map(Json)
        .map_err(|err| ErrorResponse::new(err, ctx.environment))
}
