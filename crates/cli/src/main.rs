//! envsync - configuration aggregation command line entry point

use anyhow::{Context, Result};
use clap::Parser;
use config::{ConfigLoader, LoggingConfig};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod args;
mod commands;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run() -> Result<()> {
    // Load .env before configuration so ENVSYNC_* overrides may live there
    let dotenv_result = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_logging(&config.logging)?;

    match dotenv_result {
        Ok(path) => debug!(path = %path.display(), "Loaded environment variables from .env file"),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not load .env file: {}", e),
    }

    let registry = providers::global();
    providers::register_builtin(registry).context("Failed to register built-in providers")?;
    debug!(providers = registry.len(), "Provider registry ready");

    match cli.command {
        Command::Load(args) => commands::load::run(&args, &config, registry).await,
        Command::Providers(args) => {
            commands::providers::run(&args, registry);
            Ok(())
        }
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}

/// Initialize logging from configuration; `RUST_LOG` takes precedence over the level
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    debug!(level = %logging.level, format = %logging.format, "Logging initialized");
    Ok(())
}
