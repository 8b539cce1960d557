//! PUDO metrics HTTP API
//!
//! Serves the catalog queries and the filtered composite query as JSON arrays of row
//! objects, plus liveness and readiness checks.

use std::{future::Future, net::SocketAddr};

use axum::{
    Router,
    routing::get,
    serve::{Listener as _, ListenerExt as _},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod ctx;
pub mod gateway;
pub mod handlers;
mod health;

use ctx::Ctx;
use handlers::{filter, live_data, pudos_ativos, recent_history};

/// Builds the API router over `ctx`.
pub fn router(ctx: Ctx) -> Router {
    Router::new()
        .route("/health", get(health::handle_health))
        .route("/ready", get(health::handle_ready))
        .route("/api/pudos-ativos", get(pudos_ativos::handler))
        .route("/api/recent-history", get(recent_history::handler))
        .route("/api/live-data", get(live_data::handler))
        .route("/api/filter", get(filter::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Binds the API to `at`.
///
/// Returns the bound socket address and a future that runs the server until `shutdown`
/// resolves, after which in-flight requests are drained.
pub async fn serve(
    at: SocketAddr,
    ctx: Ctx,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = Result<(), std::io::Error>>), ServeError> {
    let listener = TcpListener::bind(at)
        .await
        .map_err(|source| ServeError::TcpBind { addr: at, source })?
        .tap_io(|tcp_stream| {
            if let Err(err) = tcp_stream.set_nodelay(true) {
                tracing::warn!(error = %err, "failed to set TCP_NODELAY");
            }
        });
    let addr = listener.local_addr().map_err(ServeError::LocalAddr)?;

    let app = router(ctx);

    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    };
    Ok((addr, server))
}

/// Resolves on SIGINT or SIGTERM (Ctrl+C outside unix).
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                (Err(err), _) | (_, Err(err)) => {
                    tracing::error!(error = %err, "failed to install signal handlers");
                    return std::future::pending().await;
                }
            };
        tokio::select! {
            _ = sigint.recv() => tracing::info!(signal = "SIGINT", "shutdown signal"),
            _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "shutdown signal"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            return std::future::pending().await;
        }
        tracing::info!("shutdown signal");
    }
}

/// Errors that can occur when starting the API server
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Failed to bind TCP listener to the specified address
    ///
    /// This occurs when:
    /// - The address is already in use by another process
    /// - The port requires elevated privileges (e.g., port < 1024)
    /// - The address is not available on this system
    #[error("failed to bind to {addr}")]
    TcpBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Failed to get local address from TCP listener
    #[error("failed to get local address")]
    LocalAddr(#[source] std::io::Error),
}
