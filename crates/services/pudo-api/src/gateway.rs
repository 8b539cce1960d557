//! Execution gateway seam between the handlers and the analytics engine.

use presto_client::{ExecutionError, ResultSet};

/// Executes statements against the analytics engine.
///
/// Implementations must be safe to share across concurrently running requests.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Runs `sql` with `params` bound positionally to its `?` markers.
    async fn execute(
        &self,
        sql: &str,
        params: &[String],
        expected_columns: &[String],
    ) -> Result<ResultSet, ExecutionError>;
}

#[async_trait::async_trait]
impl Gateway for presto_client::Client {
    async fn execute(
        &self,
        sql: &str,
        params: &[String],
        expected_columns: &[String],
    ) -> Result<ResultSet, ExecutionError> {
        presto_client::Client::execute(self, sql, params, expected_columns).await
    }
}
