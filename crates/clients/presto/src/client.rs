//! Statement execution against a Presto coordinator.

use std::{sync::Arc, time::Duration};

use monitoring::logging;
use pudo_config::PrestoConfig;
use reqwest::{RequestBuilder, StatusCode};
use tokio::sync::Semaphore;
use url::Url;

use crate::{
    PREPARED_STATEMENT_NAME,
    error::ExecutionError,
    params,
    protocol::{self, QueryResults},
    result_set::ResultSet,
};

/// Timeout for establishing a TCP/TLS connection to the coordinator.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Presto client with a pooled HTTP connection and bounded query concurrency.
///
/// Cloning is cheap; clones share the connection pool and the concurrency limit.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    session: Arc<Session>,
    permits: Arc<Semaphore>,
}

/// Identity and session headers attached to every request.
struct Session {
    statement_url: String,
    user: String,
    password: Option<String>,
    source: String,
    catalog: Option<String>,
    schema: Option<String>,
}

impl Session {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(protocol::HEADER_USER, &self.user);
        match &self.password {
            Some(password) => request.basic_auth(&self.user, Some(password)),
            None => request,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("statement_url", &self.session.statement_url)
            .field("user", &self.session.user)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the coordinator described by `config`.
    pub fn new(config: &PrestoConfig) -> Result<Self, BuildClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.request_timeout)
            .build()
            .map_err(BuildClientError::Http)?;

        let statement_url = statement_url(&config.url)
            .map_err(|source| BuildClientError::InvalidUrl {
                url: config.url.to_string(),
                source,
            })?
            .to_string();

        Ok(Self {
            http,
            session: Arc::new(Session {
                statement_url,
                user: config.user.clone(),
                password: config.password.as_ref().map(|password| password.as_str().to_owned()),
                source: config.source.clone(),
                catalog: config.catalog.clone(),
                schema: config.schema.clone(),
            }),
            permits: Arc::new(Semaphore::new(config.max_concurrent_queries)),
        })
    }

    /// Executes `sql` with `params` bound positionally to its `?` markers.
    ///
    /// `expected_columns` is advisory: a mismatch with the columns reported by the engine is
    /// logged, and the engine's columns are used. No retries are attempted. Dropping the
    /// returned future while the query is running asks the coordinator to cancel it.
    #[tracing::instrument(skip_all, fields(params = params.len(), query_id = tracing::field::Empty))]
    pub async fn execute(
        &self,
        sql: &str,
        params: &[String],
        expected_columns: &[String],
    ) -> Result<ResultSet, ExecutionError> {
        // Connecting
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ExecutionError::LimiterClosed)?;

        // Submitted
        let first = self.submit(sql, params).await?;
        tracing::Span::current().record("query_id", first.id.as_str());
        tracing::debug!(query_id = %first.id, "statement accepted by engine");

        let mut in_flight = InFlight {
            http: self.http.clone(),
            session: self.session.clone(),
            next_uri: None,
        };
        let mut columns: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut page = first;

        loop {
            if let Some(error) = page.error {
                in_flight.disarm();
                return Err(ExecutionError::EngineReject {
                    query_id: page.id,
                    error_name: error.error_name.unwrap_or_else(|| "UNKNOWN".to_string()),
                    error_type: error.error_type.unwrap_or_else(|| "UNKNOWN".to_string()),
                    message: error.message,
                });
            }

            if columns.is_none()
                && let Some(page_columns) = page.columns
            {
                columns = Some(page_columns.into_iter().map(|column| column.name).collect());
            }
            if let Some(data) = page.data {
                if columns.is_none() {
                    return Err(ExecutionError::MalformedResponse(format!(
                        "query {} returned data before its columns",
                        page.id
                    )));
                }
                rows.extend(data);
            }

            let Some(next_uri) = page.next_uri else {
                in_flight.disarm();
                if let Some(stats) = &page.stats {
                    tracing::debug!(query_id = %page.id, state = %stats.state, "query finished");
                }
                break;
            };
            in_flight.next_uri = Some(next_uri.clone());

            page = self.fetch_page(&next_uri).await?;
        }

        let columns = columns.unwrap_or_default();
        if !expected_columns.is_empty() && columns.as_slice() != expected_columns {
            tracing::warn!(
                expected = ?expected_columns,
                actual = ?columns,
                "engine columns differ from the documented query schema"
            );
        }

        let result_set = ResultSet::new(columns, rows)
            .map_err(|err| ExecutionError::MalformedResponse(err.to_string()))?;
        tracing::debug!(rows = result_set.len(), "query results received");

        Ok(result_set)
    }

    /// Posts the statement, preparing it first when there are parameters to bind.
    async fn submit(&self, sql: &str, params: &[String]) -> Result<QueryResults, ExecutionError> {
        let session = &self.session;
        let mut request = session
            .authorize(self.http.post(&session.statement_url))
            .header(protocol::HEADER_SOURCE, &session.source);
        if let Some(catalog) = &session.catalog {
            request = request.header(protocol::HEADER_CATALOG, catalog);
        }
        if let Some(schema) = &session.schema {
            request = request.header(protocol::HEADER_SCHEMA, schema);
        }

        let body = if params.is_empty() {
            sql.to_string()
        } else {
            request = request.header(
                protocol::HEADER_PREPARED_STATEMENT,
                params::prepared_statement_header(PREPARED_STATEMENT_NAME, sql),
            );
            params::execute_statement(PREPARED_STATEMENT_NAME, params)
        };

        let response = request.body(body).send().await.map_err(|err| {
            if err.is_connect() {
                ExecutionError::Connect {
                    url: session.statement_url.clone(),
                    source: err,
                }
            } else if err.is_builder() {
                ExecutionError::Submit {
                    status: 0,
                    message: err.to_string(),
                }
            } else {
                ExecutionError::Request(err)
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::OK => parse_page(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ExecutionError::Unauthorized {
                user: session.user.clone(),
                status: status.as_u16(),
            }),
            status if status.is_client_error() => Err(ExecutionError::Submit {
                status: status.as_u16(),
                message: read_body(response).await,
            }),
            status => Err(ExecutionError::UnexpectedStatus {
                status: status.as_u16(),
                message: read_body(response).await,
            }),
        }
    }

    async fn fetch_page(&self, next_uri: &str) -> Result<QueryResults, ExecutionError> {
        let response = self
            .session
            .authorize(self.http.get(next_uri))
            .send()
            .await
            .map_err(ExecutionError::Request)?;

        match response.status() {
            StatusCode::OK => parse_page(response).await,
            status => Err(ExecutionError::UnexpectedStatus {
                status: status.as_u16(),
                message: read_body(response).await,
            }),
        }
    }
}

/// Resolves the statement endpoint below `base`, keeping any path prefix of the coordinator
/// URL whether or not it ends in a slash.
fn statement_url(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(protocol::STATEMENT_PATH)
}

async fn parse_page(response: reqwest::Response) -> Result<QueryResults, ExecutionError> {
    let body = response.bytes().await.map_err(ExecutionError::Request)?;
    serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!(error = %err, "failed to decode result page");
        ExecutionError::MalformedResponse(err.to_string())
    })
}

async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| String::from("Failed to read response body"))
}

/// Cancels the running query on the coordinator if dropped while armed.
struct InFlight {
    http: reqwest::Client,
    session: Arc<Session>,
    next_uri: Option<String>,
}

impl InFlight {
    fn disarm(&mut self) {
        self.next_uri = None;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(next_uri) = self.next_uri.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let request = self.session.authorize(self.http.delete(&next_uri));
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "cancelled abandoned query")
                }
                Err(err) => tracing::debug!(
                    error = %err,
                    error_source = logging::error_source(&err),
                    "failed to cancel abandoned query"
                ),
            }
        });
    }
}

/// Errors that can occur while constructing a [`Client`].
#[derive(Debug, thiserror::Error)]
pub enum BuildClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to build engine HTTP client")]
    Http(#[source] reqwest::Error),

    /// The statement endpoint cannot be derived from the coordinator URL.
    #[error("invalid coordinator url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
