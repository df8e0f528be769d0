//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Vulntriage -- vulnerability scan import and expert triage.
///
/// Use `vulntriage <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "vulntriage", version, about, long_about = None)]
pub struct Cli {
    /// Path to the vulntriage.toml configuration file.
    #[arg(short, long, default_value = "vulntriage.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a scan export file (.csv, .xlsx, .json) as a new dataset.
    Ingest(IngestArgs),

    /// List all datasets, newest first.
    Datasets,

    /// List the records of a dataset in source-file order.
    Records(RecordsArgs),

    /// Apply an expert assessment to a record.
    Assess(AssessArgs),

    /// Remove a dataset and all of its records.
    Remove(RemoveArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- ingest ----

/// Import a scan export file.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path to the scan export file.
    pub file: PathBuf,
}

// ---- records ----

/// List the records of one dataset.
#[derive(Args, Debug)]
pub struct RecordsArgs {
    /// Dataset identifier (as shown by `vulntriage datasets`).
    pub dataset_id: String,
}

// ---- assess ----

/// Apply an expert assessment to a record.
///
/// Omitting --severity / --vector / --score retracts the corresponding
/// expert field. A justification of at least 10 characters is required
/// on every call.
#[derive(Args, Debug)]
pub struct AssessArgs {
    /// Record identifier (as shown by `vulntriage records`).
    pub record_id: String,

    /// Expert severity (info, low, medium, high, critical).
    #[arg(long)]
    pub severity: Option<String>,

    /// Expert CVSS-style vector string.
    #[arg(long)]
    pub vector: Option<String>,

    /// Expert score (0.0-10.0).
    #[arg(long)]
    pub score: Option<f64>,

    /// Justification for the assessment (at least 10 characters).
    #[arg(short, long)]
    pub justification: String,
}

// ---- remove ----

/// Remove a dataset.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Dataset identifier to remove.
    pub dataset_id: String,
}

// ---- config ----

/// Manage configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file + env overrides + defaults).
    Show,
    /// Validate the configuration file and exit.
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ingest_command() {
        let cli = Cli::try_parse_from(["vulntriage", "ingest", "scan.csv"]).unwrap();
        match cli.command {
            Commands::Ingest(args) => assert_eq!(args.file, PathBuf::from("scan.csv")),
            _ => panic!("expected ingest command"),
        }
    }

    #[test]
    fn parses_datasets_command() {
        let cli = Cli::try_parse_from(["vulntriage", "datasets"]).unwrap();
        assert!(matches!(cli.command, Commands::Datasets));
    }

    #[test]
    fn parses_records_command() {
        let cli = Cli::try_parse_from(["vulntriage", "records", "ds-123"]).unwrap();
        match cli.command {
            Commands::Records(args) => assert_eq!(args.dataset_id, "ds-123"),
            _ => panic!("expected records command"),
        }
    }

    #[test]
    fn parses_assess_command_with_all_fields() {
        let cli = Cli::try_parse_from([
            "vulntriage",
            "assess",
            "rec-1",
            "--severity",
            "low",
            "--vector",
            "AV:L/AC:H",
            "--score",
            "2.5",
            "--justification",
            "mitigated by configuration",
        ])
        .unwrap();
        match cli.command {
            Commands::Assess(args) => {
                assert_eq!(args.record_id, "rec-1");
                assert_eq!(args.severity.as_deref(), Some("low"));
                assert_eq!(args.score, Some(2.5));
                assert_eq!(args.justification, "mitigated by configuration");
            }
            _ => panic!("expected assess command"),
        }
    }

    #[test]
    fn assess_requires_justification() {
        let result = Cli::try_parse_from(["vulntriage", "assess", "rec-1", "--severity", "low"]);
        assert!(result.is_err());
    }

    #[test]
    fn assess_allows_retraction_call() {
        // 심각도/점수/벡터 없이 근거만 있는 호출도 문법상 유효 (철회)
        let cli = Cli::try_parse_from([
            "vulntriage",
            "assess",
            "rec-1",
            "-j",
            "retracting earlier assessment",
        ])
        .unwrap();
        match cli.command {
            Commands::Assess(args) => {
                assert!(args.severity.is_none());
                assert!(args.vector.is_none());
                assert!(args.score.is_none());
            }
            _ => panic!("expected assess command"),
        }
    }

    #[test]
    fn parses_config_subcommands() {
        let cli = Cli::try_parse_from(["vulntriage", "config", "show"]).unwrap();
        match cli.command {
            Commands::Config(args) => assert!(matches!(args.action, ConfigAction::Show)),
            _ => panic!("expected config command"),
        }

        let cli = Cli::try_parse_from(["vulntriage", "config", "validate"]).unwrap();
        match cli.command {
            Commands::Config(args) => assert!(matches!(args.action, ConfigAction::Validate)),
            _ => panic!("expected config command"),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli =
            Cli::try_parse_from(["vulntriage", "datasets", "--output", "json", "--log-level", "debug"])
                .unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::try_parse_from(["vulntriage", "datasets"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("vulntriage.toml"));
    }
}
