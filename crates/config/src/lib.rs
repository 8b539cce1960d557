//! Process configuration for the PUDO metrics service.
//!
//! Configuration is loaded once at startup by [`load_config`], resolved into immutable
//! structs and passed explicitly to the components that need it.

use std::{
    net::{IpAddr, SocketAddr},
    path::Path,
    time::Duration,
};

use url::Url;

pub mod config_file;
mod redacted;

pub use self::{
    config_file::{ConfigFile, LoadConfigFileError},
    redacted::Redacted,
};

/// Default interface the HTTP server binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port of the HTTP server.
pub const DEFAULT_PORT: u16 = 3000;

/// Default Presto coordinator URL.
pub const DEFAULT_PRESTO_URL: &str = "https://us.presto-secure.data-infra.shopee.io:443";

/// Default per-request HTTP timeout against the coordinator (in seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default bound on concurrent engine queries.
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 16;

/// Deployment environment of the process.
///
/// Any value other than `development` (case-insensitive) is treated as production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(from = "String")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("development") {
            Environment::Development
        } else {
            Environment::Production
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub presto: PrestoConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub environment: Environment,
    /// Bound applied around each engine call by the request handlers.
    pub query_timeout: Option<Duration>,
}

/// Connection settings for the Presto coordinator.
#[derive(Debug, Clone)]
pub struct PrestoConfig {
    pub url: Url,
    pub user: String,
    pub password: Option<Redacted<String>>,
    pub source: String,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub request_timeout: Duration,
    pub max_concurrent_queries: usize,
}

impl PrestoConfig {
    /// Settings for a coordinator at `url` with defaults for everything else.
    pub fn new(url: Url, user: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            url,
            source: default_source(&user),
            user,
            password: None,
            catalog: None,
            schema: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
        }
    }
}

/// The `X-Presto-Source` value expected by the analytics cluster for ad-hoc BI clients.
pub fn default_source(user: &str) -> String {
    format!("(49)-(brbi-adhoc)-({user})-(jdbc)-({user})-(USEast)")
}

/// Loads the configuration file (if any) plus environment overrides and resolves it.
pub fn load_config(config_path: Option<&Path>) -> Result<Config, LoadConfigError> {
    let config_file = config_file::load(config_path)?;
    Config::from_config_file(config_file)
}

impl Config {
    pub fn from_config_file(config_file: ConfigFile) -> Result<Self, LoadConfigError> {
        let ConfigFile { server, presto } = config_file;

        let host = server.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip: IpAddr = host.parse().map_err(|source| LoadConfigError::InvalidHost {
            host: host.to_string(),
            source,
        })?;
        let query_timeout = match server.query_timeout_secs {
            None => None,
            Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
            Some(secs) => return Err(LoadConfigError::InvalidQueryTimeout(secs)),
        };

        let url_str = presto.url.as_deref().unwrap_or(DEFAULT_PRESTO_URL);
        let url = Url::parse(url_str).map_err(|source| LoadConfigError::InvalidPrestoUrl {
            url: url_str.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoadConfigError::UnsupportedPrestoScheme(
                url.scheme().to_string(),
            ));
        }
        let user = match presto.user {
            Some(user) if !user.is_empty() => user,
            _ => return Err(LoadConfigError::MissingPrestoUser),
        };
        let max_concurrent_queries = presto
            .max_concurrent_queries
            .unwrap_or(DEFAULT_MAX_CONCURRENT_QUERIES);
        if max_concurrent_queries == 0 {
            return Err(LoadConfigError::ZeroConcurrency);
        }
        let request_timeout_secs = presto
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(LoadConfigError::ZeroRequestTimeout);
        }

        Ok(Self {
            server: ServerConfig {
                addr: SocketAddr::new(ip, server.port.unwrap_or(DEFAULT_PORT)),
                environment: server.environment.unwrap_or_default(),
                query_timeout,
            },
            presto: PrestoConfig {
                url,
                source: presto.source.unwrap_or_else(|| default_source(&user)),
                user,
                password: presto.password,
                catalog: presto.catalog,
                schema: presto.schema,
                request_timeout: Duration::from_secs(request_timeout_secs),
                max_concurrent_queries,
            },
        })
    }
}

/// Errors that can occur while loading and resolving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum LoadConfigError {
    /// The file or environment could not be deserialized.
    #[error(transparent)]
    File(#[from] LoadConfigFileError),

    /// `server.host` is not an IP address.
    #[error("invalid server host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// `server.query_timeout_secs` is zero, negative or not a number.
    #[error("invalid query timeout {0}, must be a positive number of seconds")]
    InvalidQueryTimeout(f64),

    /// `presto.url` is not a valid URL.
    #[error("invalid presto url '{url}': {source}")]
    InvalidPrestoUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// `presto.url` does not use http or https.
    #[error("unsupported presto url scheme '{0}', expected http or https")]
    UnsupportedPrestoScheme(String),

    /// No user was configured for the engine connection.
    #[error(
        "missing presto user, set presto.user in the config file, PUDO_CONFIG_PRESTO__USER or PRESTO_USERNAME"
    )]
    MissingPrestoUser,

    /// `presto.max_concurrent_queries` is zero.
    #[error("presto.max_concurrent_queries must be greater than zero")]
    ZeroConcurrency,

    /// `presto.request_timeout_secs` is zero, which would fail every engine request.
    #[error("presto.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,
}
