//! A set of utilities to enable logging configuration using tracing_subscriber.

use std::{io::IsTerminal, sync::Once};

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

static PUDO_LOG_ENV_VAR: &str = "PUDO_LOG";

/// Initializes a tracing subscriber for logging.
pub fn init() {
    // Since we also use this function to enable logging in tests, wrap it in `Once` to prevent
    // multiple initializations.
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (env_filter, pudo_log_level) = env_filter_and_log_level();

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .init();

        tracing::info!("log level: {}", pudo_log_level);
    });
}

/// Formats the chain of sources of `err`, excluding `err` itself.
///
/// Returns an empty string when the error has no source. Intended for the `error_source`
/// field next to `error = %err` in log statements.
pub fn error_source(err: &dyn std::error::Error) -> String {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain.join(" -> ")
}

/// Formats `err` followed by its source chain: `err | Caused by: a -> b`.
pub fn error_with_causes(err: &dyn std::error::Error) -> String {
    let sources = error_source(err);
    if sources.is_empty() {
        err.to_string()
    } else {
        format!("{err} | Caused by: {sources}")
    }
}

/// List of crates in the workspace.
const PUDO_CRATES: &[&str] = &[
    "monitoring",
    "presto_client",
    "pudo_api",
    "pudo_config",
    "pudod",
    "queries",
];

fn env_filter_and_log_level() -> (EnvFilter, String) {
    // Parse directives from RUST_LOG
    let log_filter = EnvFilter::builder().with_default_directive(LevelFilter::ERROR.into());
    let directive_string = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let mut env_filter = log_filter.parse_lossy(&directive_string);

    let log_level = std::env::var(PUDO_LOG_ENV_VAR).unwrap_or_else(|_| "info".to_string());

    for crate_name in PUDO_CRATES {
        // Add directives for each crate in PUDO_CRATES, if not overriden by RUST_LOG
        if !directive_string.contains(&format!("{crate_name}=")) {
            match format!("{crate_name}={log_level}").parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(err) => eprintln!("ignoring invalid {PUDO_LOG_ENV_VAR} value: {err}"),
            }
        }
    }

    (env_filter, log_level)
}

/// If this fails, just update the above `PUDO_CRATES` to match reality.
#[test]
fn assert_pudo_crates() {
    use cargo_metadata::MetadataCommand;

    let cmd = MetadataCommand::new().exec().unwrap();
    let mut names: Vec<String> = cmd
        .workspace_packages()
        .into_iter()
        .map(|pkg| pkg.name.replace("-", "_").clone())
        .collect();
    names.sort();
    assert_eq!(names, PUDO_CRATES);
}
