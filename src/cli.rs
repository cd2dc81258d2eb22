//! CLI argument parsing for policyproof

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "policyproof")]
#[command(version)]
#[command(
    about = "Validate a routing/caching policy against a baseline from experiment logs",
    long_about = None
)]
pub struct Cli {
    /// Baseline app log (JSON lines, optionally `[pod/NAME/CONTAINER]`-prefixed)
    #[arg(value_name = "BASELINE_APP")]
    pub baseline_app: PathBuf,

    /// Policy app log
    #[arg(value_name = "POLICY_APP")]
    pub policy_app: PathBuf,

    /// Policy router log
    #[arg(value_name = "POLICY_ROUTER")]
    pub policy_router: PathBuf,

    /// TOML criteria table (defaults to the built-in auth/features/document targets)
    #[arg(long = "criteria", value_name = "FILE")]
    pub criteria: Option<PathBuf>,

    /// Override the overall diversion-rate ceiling (exclusive)
    #[arg(long = "max-diversion", value_name = "RATE")]
    pub max_diversion: Option<f64>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Exit with status 1 when the criteria are not met
    #[arg(long = "fail-on-criteria")]
    pub fail_on_criteria: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_three_paths() {
        let cli = Cli::parse_from(["policyproof", "base.jsonl", "pol.jsonl", "router.jsonl"]);
        assert_eq!(cli.baseline_app, PathBuf::from("base.jsonl"));
        assert_eq!(cli.policy_app, PathBuf::from("pol.jsonl"));
        assert_eq!(cli.policy_router, PathBuf::from("router.jsonl"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.fail_on_criteria);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_requires_three_paths() {
        assert!(Cli::try_parse_from(["policyproof", "base.jsonl", "pol.jsonl"]).is_err());
        assert!(Cli::try_parse_from(["policyproof"]).is_err());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from([
            "policyproof",
            "--format",
            "json",
            "--criteria",
            "targets.toml",
            "--max-diversion",
            "0.2",
            "--fail-on-criteria",
            "a",
            "b",
            "c",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.criteria, Some(PathBuf::from("targets.toml")));
        assert_eq!(cli.max_diversion, Some(0.2));
        assert!(cli.fail_on_criteria);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["policyproof", "--format", "xml", "a", "b", "c"]).is_err());
    }
}
