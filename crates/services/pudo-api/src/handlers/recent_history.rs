//! Recent history handler

use axum::{Json, extract::State};
use presto_client::ResultSet;
use queries::catalog::RECENT_HISTORY;

use crate::{ctx::Ctx, handlers::common, handlers::error::ErrorResponse};

/// Handler for the `GET /api/recent-history` endpoint
///
/// Returns, per point, the peak stored volume over the last 28 days and the count of
/// shipments in each size class (`P`, `M`, `G`, `GG`).
#[tracing::instrument(skip_all, err)]
pub async fn handler(State(ctx): State<Ctx>) -> Result<Json<ResultSet>, ErrorResponse> {
    common::run_catalog_query(&ctx, RECENT_HISTORY)
        .await
        .map(Json)
        .map_err(|err| ErrorResponse::new(err, ctx.environment))
}
