//! Execution failure classification.

/// Stage of an engine call in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No authenticated session could be established (limiter, TCP/TLS, credentials).
    Connect,
    /// The coordinator refused the submitted request itself.
    Submit,
    /// The engine accepted the statement but failed it (syntax, permissions, runtime).
    EngineReject,
    /// The exchange broke down after submission (I/O, timeouts, malformed payloads).
    Transport,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Connect => "connect",
            Phase::Submit => "submit",
            Phase::EngineReject => "engine-reject",
            Phase::Transport => "transport",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`Client::execute`](crate::Client::execute).
///
/// Messages never include the configured password.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The concurrency limiter guarding engine connections was closed
    #[error("engine connection limiter closed")]
    LimiterClosed,

    /// Could not open a connection to the coordinator
    ///
    /// This occurs when:
    /// - The coordinator host is unreachable or refuses the connection
    /// - DNS resolution or the TLS handshake fails
    #[error("failed to connect to engine at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The coordinator rejected the configured credentials
    #[error("engine rejected credentials for user '{user}' (HTTP {status})")]
    Unauthorized { user: String, status: u16 },

    /// The coordinator refused the statement submission request
    ///
    /// A well-formed composed statement never triggers this; it points at a bug in how the
    /// request was built (headers, prepared statement encoding).
    #[error("engine refused statement submission (HTTP {status}): {message}")]
    Submit { status: u16, message: String },

    /// The engine reported a query failure
    #[error("query {query_id} failed: {error_name} ({error_type}): {message}")]
    EngineReject {
        query_id: String,
        error_name: String,
        error_type: String,
        message: String,
    },

    /// An HTTP exchange with the coordinator failed after the connection was established
    #[error("engine request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The coordinator answered with an unexpected HTTP status
    #[error("unexpected engine response (HTTP {status}): {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The coordinator answered with a payload that is not a valid result page
    #[error("malformed engine response: {0}")]
    MalformedResponse(String),
}

impl ExecutionError {
    pub fn phase(&self) -> Phase {
        match self {
            ExecutionError::LimiterClosed
            | ExecutionError::Connect { .. }
            | ExecutionError::Unauthorized { .. } => Phase::Connect,
            ExecutionError::Submit { .. } => Phase::Submit,
            ExecutionError::EngineReject { .. } => Phase::EngineReject,
            ExecutionError::Request(_)
            | ExecutionError::UnexpectedStatus { .. }
            | ExecutionError::MalformedResponse(_) => Phase::Transport,
        }
    }

    /// Whether the failure was the HTTP client giving up waiting on the coordinator.
    pub fn is_timeout(&self) -> bool {
        match self {
            ExecutionError::Connect { source, .. } | ExecutionError::Request(source) => {
                source.is_timeout()
            }
            _ => false,
        }
    }
}
