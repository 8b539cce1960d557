use std::sync::Arc;

use pudo_api::ctx::Ctx;
use pudo_config::Config;
use queries::QueryCatalog;

pub async fn run(config: Config) -> Result<(), Error> {
    let Config { server, presto } = config;

    let client = presto_client::Client::new(&presto).map_err(Error::BuildClient)?;
    tracing::info!(
        url = %presto.url,
        user = %presto.user,
        max_concurrent_queries = presto.max_concurrent_queries,
        "Presto client configured"
    );

    let ctx = Ctx {
        catalog: Arc::new(QueryCatalog::builtin()),
        gateway: Arc::new(client),
        environment: server.environment,
        query_timeout: server.query_timeout,
    };

    let (addr, server_fut) = pudo_api::serve(server.addr, ctx, pudo_api::shutdown_signal())
        .await
        .map_err(Error::ServerStart)?;
    tracing::info!(environment = ?server.environment, "PUDO metrics API running at {}", addr);

    server_fut.await.map_err(Error::ServerRuntime)
}

/// Errors that can occur while running the API server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The Presto client could not be constructed from the configuration.
    #[error("Failed to build Presto client: {0}")]
    BuildClient(#[source] presto_client::BuildClientError),

    /// Failed to bind the HTTP listener.
    #[error("Failed to start server: {0}")]
    ServerStart(#[source] pudo_api::ServeError),

    /// The HTTP server stopped with an I/O error.
    #[error("Server runtime error: {0}")]
    ServerRuntime(#[source] std::io::Error),
}
