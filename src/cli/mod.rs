//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Kinetic using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Kinetic - Local pseudonymization of Dutch medical records
#[derive(Parser, Debug)]
#[command(name = "kinetic")]
#[command(version, about, long_about = None)]
#[command(author = "Kinetic Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "kinetic.toml", env = "KINETIC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "KINETIC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pseudonymize text files in one session
    Pseudonymize(commands::pseudonymize::PseudonymizeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pseudonymization::AnchorPolicy;

    #[test]
    fn test_cli_parse_pseudonymize() {
        let cli = Cli::parse_from(["kinetic", "pseudonymize", "a.txt", "b.txt"]);
        assert_eq!(cli.config, "kinetic.toml");
        match cli.command {
            Commands::Pseudonymize(args) => {
                assert_eq!(args.files.len(), 2);
                assert!(!args.dry_run);
            }
            _ => panic!("expected pseudonymize"),
        }
    }

    #[test]
    fn test_cli_parse_pseudonymize_options() {
        let cli = Cli::parse_from([
            "kinetic",
            "pseudonymize",
            "--anchor",
            "incident",
            "--anchor-date",
            "15-01-2024",
            "--timeout-ms",
            "500",
            "--dry-run",
            "brief.txt",
        ]);
        match cli.command {
            Commands::Pseudonymize(args) => {
                assert_eq!(args.anchor, Some(AnchorPolicy::Incident));
                assert_eq!(args.anchor_date.as_deref(), Some("15-01-2024"));
                assert_eq!(args.timeout_ms, Some(500));
                assert!(args.dry_run);
            }
            _ => panic!("expected pseudonymize"),
        }
    }

    #[test]
    fn test_cli_pseudonymize_requires_files() {
        assert!(Cli::try_parse_from(["kinetic", "pseudonymize"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["kinetic", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["kinetic", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
