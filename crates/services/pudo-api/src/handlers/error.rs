//! Error handling types for HTTP handlers

use axum::{Json, http::StatusCode};
use monitoring::logging;
use pudo_config::Environment;

/// Standard error response returned by the API
///
/// ## Error Code Conventions
/// - Error codes use SCREAMING_SNAKE_CASE (e.g., `INVALID_DATA_TYPE`)
/// - Codes are stable and can be relied upon programmatically
/// - Messages may change and should only be used for display/logging
///
/// ## Example JSON Response
/// ```json
/// {
///   "error": "failed to connect to the analytics engine",
///   "error_code": "ENGINE_CONNECT_ERROR",
///   "details": "failed to connect to the analytics engine | Caused by: ..."
/// }
/// ```
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// HTTP status code for this error
    ///
    /// Not serialized to JSON - used internally for response construction
    #[serde(skip)]
    pub status_code: StatusCode,

    /// Human-readable summary, safe to show to any caller
    pub error: String,

    /// Machine-readable error code in SCREAMING_SNAKE_CASE format
    pub error_code: String,

    /// Full error chain, only populated outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Builds the response for `error`, attaching the source chain unless `environment` is
    /// production.
    pub fn new<E>(error: E, environment: Environment) -> Self
    where
        E: IntoErrorResponse,
    {
        let details = (!environment.is_production()).then(|| logging::error_with_causes(&error));
        ErrorResponse {
            status_code: error.status_code(),
            error: error.to_string(),
            error_code: error.error_code().to_string(),
            details,
        }
    }
}

/// Trait for error types that can be converted to HTTP error responses
///
/// The `Display` output of implementors is returned to callers as is, so it must not
/// include engine credentials or internal messages. Those belong in the `#[source]` chain.
pub trait IntoErrorResponse: std::error::Error + Send + Sync + 'static {
    /// Returns a stable, machine-readable error code
    fn error_code(&self) -> &'static str;

    /// Returns the HTTP status code for this error
    fn status_code(&self) -> StatusCode;
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl axum::response::IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("engine unavailable")]
    struct Unavailable(#[source] std::io::Error);

    impl IntoErrorResponse for Unavailable {
        fn error_code(&self) -> &'static str {
            "ENGINE_CONNECT_ERROR"
        }

        fn status_code(&self) -> StatusCode {
            StatusCode::BAD_GATEWAY
        }
    }

    fn unavailable() -> Unavailable {
        Unavailable(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }

    #[test]
    fn production_response_omits_details() {
        let response = ErrorResponse::new(unavailable(), Environment::Production);

        let body = serde_json::to_value(&response).expect("serializable");

        assert_eq!(response.status_code, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            serde_json::json!({
                "error": "engine unavailable",
                "error_code": "ENGINE_CONNECT_ERROR",
            })
        );
    }

    #[test]
    fn development_response_carries_error_chain() {
        let response = ErrorResponse::new(unavailable(), Environment::Development);

        assert_eq!(
            response.details.as_deref(),
            Some("engine unavailable | Caused by: connection refused")
        );
    }
}
