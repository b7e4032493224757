//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Marketing Miner - campaign analytics tools for LLM agents
///
/// Summarizes a marketing campaign event log and compares months,
/// either directly or through the same tool-call interface an agent
/// framework uses.
///
/// Examples:
///   mminer summary
///   mminer compare "Jan 25" "Feb 25" --format json
///   mminer call analyze_mom_data '{"period1": "Feb 24", "period2": "Feb 25"}'
///   mminer manifest
///   mminer --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Dataset file to read (repeatable)
    ///
    /// Replaces the configured candidate paths; the first existing file wins.
    #[arg(short, long = "data", value_name = "FILE", global = true, env = "MMINER_DATA")]
    pub data: Vec<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mminer.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .mminer.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Summarize the whole dataset
    Summary,

    /// Compare two months, e.g. "Jan 25" "Feb 25"
    Compare {
        /// First period (e.g. 'Feb 24', 'March 2025')
        period1: String,
        /// Second period, the baseline for percentage changes
        period2: String,
    },

    /// Execute a tool the way the agent framework would
    Call {
        /// Tool name
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(value_name = "ARGS_JSON")]
        arguments: Option<String>,
    },

    /// Print the agent manifest (agent metadata and tool definitions)
    Manifest,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        let Some(command) = &self.command else {
            return Err("A command is required (summary, compare, call, manifest)".to_string());
        };

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Command::Compare { period1, period2 } = command {
            if period1.trim().is_empty() || period2.trim().is_empty() {
                return Err("Periods must not be empty".to_string());
            }
        }

        if let Command::Call {
            arguments: Some(arguments),
            ..
        } = command
        {
            match serde_json::from_str::<serde_json::Value>(arguments) {
                Ok(value) if value.is_object() => {}
                Ok(_) => return Err("Tool arguments must be a JSON object".to_string()),
                Err(e) => return Err(format!("Tool arguments are not valid JSON: {}", e)),
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            command: Some(Command::Summary),
            data: Vec::new(),
            config: None,
            output: None,
            format: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_compare() {
        let args =
            Args::try_parse_from(["mminer", "compare", "Jan 25", "Feb 25", "--format", "json"])
                .unwrap();
        assert_eq!(
            args.command,
            Some(Command::Compare {
                period1: "Jan 25".to_string(),
                period2: "Feb 25".to_string(),
            })
        );
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_parse_repeated_data_paths() {
        let args = Args::try_parse_from(["mminer", "-d", "a.csv", "--data", "b.csv", "summary"])
            .unwrap();
        assert_eq!(args.data, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
    }

    #[test]
    fn test_validation_requires_command() {
        let mut args = make_args();
        args.command = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_tool_arguments() {
        let mut args = make_args();
        args.command = Some(Command::Call {
            tool: "analyze_mom_data".to_string(),
            arguments: Some("[1, 2]".to_string()),
        });
        assert!(args.validate().is_err());

        args.command = Some(Command::Call {
            tool: "analyze_mom_data".to_string(),
            arguments: Some(r#"{"period1": "Jan 25"}"#.to_string()),
        });
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
