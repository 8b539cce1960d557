use std::path::PathBuf;

use monitoring::logging;

mod compose_cmd;
mod server_cmd;

#[derive(Debug, clap::Parser)]
#[command(version)]
struct Args {
    /// The configuration file to use. Every setting can also be provided through
    /// `PUDO_CONFIG_*` environment variables, which take precedence over the file.
    #[arg(long, env = "PUDO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
enum Command {
    /// HTTP server exposing the PUDO metrics API.
    ///
    /// Connects to the configured Presto coordinator and serves until SIGINT or SIGTERM.
    Server,
    /// Print the statement and bound parameters a filtered request would run.
    ///
    /// Performs no I/O against the engine.
    Compose {
        /// Base data set: `recent-history` or `live`.
        #[arg(long)]
        data_type: String,
        /// Restrict to points in this state (`All` for no restriction).
        #[arg(long)]
        state: Option<String>,
        /// Restrict to points in this city (`All` for no restriction).
        #[arg(long)]
        city: Option<String>,
        /// Restrict to a single point (`All` for no restriction).
        #[arg(long)]
        dop_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = main_inner().await {
        // Manually print the error so we can control the format.
        let err = logging::error_with_causes(&err);
        eprintln!("Exiting with error: {err}");
        std::process::exit(1);
    }
}

async fn main_inner() -> Result<(), Error> {
    // Variables from `.env` must be visible before the log filter and config are read.
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(Error::DotEnv(err));
    }

    logging::init();

    let Args {
        config: config_path,
        command,
    } = clap::Parser::parse();

    tracing::info!("version {}", env!("CARGO_PKG_VERSION"));

    match command {
        Command::Server => {
            if let Some(path) = &config_path
                && !path.is_file()
            {
                return Err(Error::ConfigNotAFile(path.clone()));
            }
            let config =
                pudo_config::load_config(config_path.as_deref()).map_err(Error::LoadConfig)?;

            server_cmd::run(config).await.map_err(Error::Server)
        }
        Command::Compose {
            data_type,
            state,
            city,
            dop_id,
        } => {
            let output = compose_cmd::run(
                &data_type,
                state.as_deref(),
                city.as_deref(),
                dop_id.as_deref(),
            )
            .map_err(Error::Compose)?;
            println!("{output}");
            Ok(())
        }
    }
}

/// Top-level error type for the `pudod` binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The `.env` file exists but could not be read or parsed.
    #[error("Failed to load .env file: {0}")]
    DotEnv(#[source] dotenvy::Error),

    /// Config path exists but is not a file.
    #[error("config path is not a file: {0}")]
    ConfigNotAFile(PathBuf),

    /// Failed to load configuration.
    #[error("Failed to load config: {0}")]
    LoadConfig(#[source] pudo_config::LoadConfigError),

    /// Server command failed.
    #[error("Server command failed: {0}")]
    Server(#[source] server_cmd::Error),

    /// Compose command failed.
    #[error("Compose command failed: {0}")]
    Compose(#[source] compose_cmd::Error),
}
