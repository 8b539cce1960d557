//! Liveness and readiness checks

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use monitoring::logging;

use crate::ctx::Ctx;

/// Bound on the readiness check query.
const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Health check handler
pub async fn handle_health() -> &'static str {
    "OK"
}

/// Readiness check handler
///
/// Runs a trivial statement through the gateway to confirm the engine is reachable.
pub async fn handle_ready(State(ctx): State<Ctx>) -> impl IntoResponse {
    let result = tokio::time::timeout(READY_TIMEOUT, ctx.gateway.execute("SELECT 1", &[], &[])).await;

    match result {
        Ok(Ok(_)) => (StatusCode::OK, "OK".to_string()).into_response(),
        Ok(Err(err)) => {
            tracing::warn!(
                phase = %err.phase(),
                error = %err,
                error_source = logging::error_source(&err),
                "readiness check failed"
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Engine unavailable ({} failure)", err.phase()),
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Readiness check timeout".to_string(),
        )
            .into_response(),
    }
}
