//! Command line arguments

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use types::MergeStrategy;

/// Aggregate configuration from multiple sources into one environment.
#[derive(Parser, Debug)]
#[command(name = "envsync", version)]
pub struct Cli {
    /// Configuration file (defaults to .envsync.yaml when present).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Load, merge and optionally validate and export configuration.
    Load(LoadArgs),

    /// List registered configuration providers.
    Providers(ProvidersArgs),

    /// Print version information.
    Version,
}

/// Arguments for the `load` subcommand.
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Source to load, as `provider:path` or a bare path. Repeatable, applied in order.
    #[arg(long = "from", short = 'f', required = true, value_name = "SOURCE")]
    pub from: Vec<String>,

    /// JSON Schema file the merged configuration must satisfy.
    #[arg(long, value_name = "SCHEMA")]
    pub validate: Option<PathBuf>,

    /// Export destination, as `format:path` (env, json, yaml).
    #[arg(long, short = 'e', value_name = "DEST")]
    pub export: Option<String>,

    /// How duplicate keys are resolved: override, preserve or error.
    #[arg(long, short = 'm', value_parser = parse_merge_strategy)]
    pub merge_strategy: Option<MergeStrategy>,

    /// Load timeout, e.g. `30s`, `2m`, `500ms` or bare seconds.
    #[arg(long, short = 't', value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Directory relative export paths resolve against.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Load and validate without writing any files.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Arguments for the `providers` subcommand.
#[derive(Parser, Debug)]
pub struct ProvidersArgs {
    /// Show priority, supported sources and configuration keys.
    #[arg(long, short = 'd', default_value_t = false)]
    pub details: bool,

    /// Only list providers whose name, alias or description contains this text.
    #[arg(long)]
    pub filter: Option<String>,
}

fn parse_merge_strategy(s: &str) -> Result<MergeStrategy, String> {
    s.to_lowercase().parse()
}

/// Parse `500ms`, `30s`, `2m`, `1h` or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    if digits.is_empty() {
        return Err(format!("invalid duration: {s:?}"));
    }
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration: {s:?}"))?;

    let duration = match unit {
        "" | "s" => Duration::from_secs(value),
        "ms" => Duration::from_millis(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        "h" => Duration::from_secs(value.saturating_mul(3600)),
        other => return Err(format!("unknown duration unit {other:?} in {s:?}")),
    };
    if duration.is_zero() {
        return Err("timeout must be greater than 0".to_string());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("10d").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn test_load_args() {
        let cli = Cli::try_parse_from([
            "envsync",
            "load",
            "--from",
            "local:.env",
            "--from",
            "config.json",
            "--merge-strategy",
            "Preserve",
            "--timeout",
            "2m",
            "--export",
            "json:out.json",
            "--dry-run",
        ])
        .unwrap();

        let Command::Load(args) = cli.command else {
            panic!("expected load command");
        };
        assert_eq!(args.from, vec!["local:.env", "config.json"]);
        assert_eq!(args.merge_strategy, Some(MergeStrategy::Preserve));
        assert_eq!(args.timeout, Some(Duration::from_secs(120)));
        assert_eq!(args.export.as_deref(), Some("json:out.json"));
        assert!(args.dry_run);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_load_requires_a_source() {
        assert!(Cli::try_parse_from(["envsync", "load"]).is_err());
        assert!(Cli::try_parse_from(["envsync", "load", "-f", "a.env", "-m", "sometimes"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["envsync", "providers", "--details", "--config", "ci.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
        assert!(matches!(cli.command, Command::Providers(ProvidersArgs { details: true, .. })));
    }
}
