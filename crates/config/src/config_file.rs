//! TOML configuration file loading with environment variable overrides.
//!
//! Deserializes a [`ConfigFile`] using [Figment]. The raw [`ConfigFile`] is later resolved
//! into a [`Config`](crate::Config) by [`crate::load_config`].
//!
//! ## Priority chain
//!
//! | Priority | Source | Mechanism |
//! |----------|--------|-----------|
//! | 1 (highest) | `PUDO_CONFIG_*` env vars | `merge`, always wins |
//! | 2 | TOML file values | `merge`, base configuration |
//! | 3 (lowest) | Legacy env vars (`PORT`, `PRESTO_USERNAME`, `PRESTO_PASSWORD`, `NODE_ENV`) | `join`, fallback only |
//!
//! ## Environment variables
//!
//! All env vars are prefixed with `PUDO_CONFIG_` and use double underscores to separate
//! nested keys. For example, `PUDO_CONFIG_PRESTO__USER` maps to `presto.user`.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};

use crate::{Environment, Redacted};

/// Prefix of the environment variables overriding config file keys.
pub const ENV_PREFIX: &str = "PUDO_CONFIG_";

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub presto: PrestoSection,
}

/// `[server]` table.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ServerSection {
    /// Interface to bind the HTTP server to (default: "0.0.0.0")
    pub host: Option<String>,
    /// Port to bind the HTTP server to (default: 3000)
    pub port: Option<u16>,
    /// Deployment environment; error details are only returned outside production
    /// (default: production)
    pub environment: Option<Environment>,
    /// Upper bound on a single engine query in seconds (default: unbounded)
    pub query_timeout_secs: Option<f64>,
}

/// `[presto]` table.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PrestoSection {
    /// Coordinator base URL (default: "https://us.presto-secure.data-infra.shopee.io:443")
    pub url: Option<String>,
    /// User the queries run as
    pub user: Option<String>,
    /// Password for HTTP basic authentication
    pub password: Option<Redacted<String>>,
    /// Value of the `X-Presto-Source` header (default derived from `user`)
    pub source: Option<String>,
    /// Session catalog
    pub catalog: Option<String>,
    /// Session schema
    pub schema: Option<String>,
    /// Per-request HTTP timeout in seconds (default: 300)
    pub request_timeout_secs: Option<u64>,
    /// Maximum number of queries in flight against the engine (default: 16)
    pub max_concurrent_queries: Option<usize>,
}

/// Load a [`ConfigFile`] from an optional TOML file with env-var overrides.
///
/// See the [module-level docs](self) for the priority chain. A missing file contributes no
/// values.
pub fn load(config_path: Option<&Path>) -> Result<ConfigFile, LoadConfigFileError> {
    let mut figment = Figment::new();
    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .join(legacy_env());

    figment.extract().map_err(|err| LoadConfigFileError(Box::new(err)))
}

/// Variables read by the previous deployment of the service, mapped onto config keys.
fn legacy_env() -> Figment {
    let mut figment = Figment::new();

    if let Ok(port) = std::env::var("PORT") {
        match port.parse::<u16>() {
            Ok(port) => figment = figment.join(Serialized::default("server.port", port)),
            Err(err) => tracing::warn!(value = %port, error = %err, "ignoring invalid PORT"),
        }
    }
    if let Ok(user) = std::env::var("PRESTO_USERNAME") {
        figment = figment.join(Serialized::default("presto.user", user));
    }
    if let Ok(password) = std::env::var("PRESTO_PASSWORD") {
        figment = figment.join(Serialized::default("presto.password", password));
    }
    if let Ok(environment) = std::env::var("NODE_ENV") {
        figment = figment.join(Serialized::default("server.environment", environment));
    }

    figment
}

/// Failed to extract the configuration from the file and environment.
#[derive(Debug, thiserror::Error)]
#[error("failed to load configuration: {0}")]
pub struct LoadConfigFileError(#[source] pub Box<figment::Error>);
