//! `load` command

use crate::app;
use crate::args::LoadArgs;
use anyhow::{bail, Context, Result};
use client::{Client, Environment};
use config::EnvSyncConfig;
use exporter::MultiFormatExporter;
use providers::Registry;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use types::{LoadOptions, MergeStrategy};
use validator::SchemaValidator;

/// Command line flags resolved against configuration defaults
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    pub sources: Vec<String>,
    pub strategy: MergeStrategy,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub schema: Option<PathBuf>,
    pub export: Option<String>,
    pub dry_run: bool,
}

impl LoadPlan {
    pub fn from_args(args: &LoadArgs, config: &EnvSyncConfig) -> Result<Self> {
        if args.from.len() > config.load.max_sources {
            bail!(
                "Too many sources: {} (maximum {})",
                args.from.len(),
                config.load.max_sources
            );
        }
        if let Some(schema) = &args.validate {
            if !schema.is_file() {
                bail!("Schema file not found: {}", schema.display());
            }
        }

        Ok(Self {
            sources: args.from.clone(),
            strategy: args.merge_strategy.unwrap_or(config.load.merge_strategy),
            timeout: args.timeout.unwrap_or_else(|| config.load.timeout()),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.load.output_dir)),
            schema: args.validate.clone(),
            export: args.export.clone(),
            dry_run: args.dry_run,
        })
    }

    fn options(&self) -> LoadOptions {
        let options = LoadOptions::new(self.sources.iter().cloned()).with_strategy(self.strategy);
        match &self.schema {
            Some(schema) => options.with_schema(schema.clone()),
            None => options,
        }
    }
}

pub async fn run(args: &LoadArgs, config: &EnvSyncConfig, registry: &Registry) -> Result<()> {
    let plan = LoadPlan::from_args(args, config)?;
    let client = app::build_client(config, registry)?;

    let cancel = CancellationToken::new();
    let watchdog = spawn_watchdog(cancel.clone(), plan.timeout);
    let outcome = execute(&plan, client, &cancel, &mut std::io::stdout()).await;
    let cancelled = cancel.is_cancelled();
    watchdog.abort();

    match outcome {
        Err(err) if cancelled => Err(err.context(format!(
            "Load aborted after timeout ({:?}) or interrupt",
            plan.timeout
        ))),
        other => other.map(drop),
    }
}

/// Wire the validator and exporter, load, then export unless this is a dry run
pub async fn execute<W: Write>(
    plan: &LoadPlan,
    mut client: Client,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<Environment> {
    if let Some(schema) = &plan.schema {
        let validator = SchemaValidator::from_file(schema)
            .with_context(|| format!("Failed to load schema {}", schema.display()))?;
        client.set_validator(Arc::new(validator));
    }

    if let Some(destination) = &plan.export {
        let exporter = MultiFormatExporter::new(&plan.output_dir);
        exporter
            .resolve(destination)
            .with_context(|| format!("Invalid export destination '{destination}'"))?;
        client.set_exporter(Arc::new(exporter));
    }

    writeln!(out, "Loading configuration from {} sources...", plan.sources.len())?;
    let env = client
        .load(cancel, &plan.options())
        .await
        .context("Failed to load configuration")?;
    writeln!(out, "Successfully loaded {} configuration keys", env.len())?;

    if plan.dry_run {
        writeln!(out, "\nDry run completed - no files were written")?;
        writeln!(out, "Configuration keys:")?;
        for key in env.keys() {
            writeln!(out, "  {key}")?;
        }
        return Ok(env);
    }

    if let Some(destination) = &plan.export {
        writeln!(out, "Exporting configuration to {destination}...")?;
        let written = env
            .export(cancel, destination)
            .await
            .context("Failed to export configuration")?;
        writeln!(out, "Configuration exported to {}", written.display())?;
    }

    Ok(env)
}

/// Cancel `cancel` once `timeout` elapses or on Ctrl-C
fn spawn_watchdog(cancel: CancellationToken, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interrupted = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Could not listen for interrupts");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(timeout) => {
                warn!(timeout = ?timeout, "Load timed out, cancelling");
            }
            _ = interrupted => {
                info!("Interrupt received, cancelling load");
            }
        }
        cancel.cancel();
    })
}
