//! Marketing Miner - campaign analytics tools for LLM agents
//!
//! A CLI that exposes two analysis tools over a marketing event log:
//! a dataset summary and a month-over-month comparison. The same tools
//! are available through a status-tagged tool-call interface for an
//! external agent framework.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime or analysis error

mod agent;
mod analysis;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod report;

use agent::{AgentManifest, ToolCall, ToolExecutor};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, Command, OutputFormat};
use config::Config;
use error::AnalysisError;
use models::Dataset;
use report::ReportMetadata;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);

    debug!("Marketing Miner v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .mminer.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("Created {} with default settings.", config::CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the selected command. Returns the process exit code.
fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let Some(command) = args.command.clone() else {
        anyhow::bail!("No command given");
    };

    match command {
        Command::Summary => {
            let dataset = match load_dataset(&config, analysis::summary::CONTEXT) {
                Ok(dataset) => dataset,
                Err(e) => return fail(e),
            };
            let summary = match analysis::summary::summarize(&dataset) {
                Ok(summary) => summary,
                Err(e) => return fail(e),
            };

            let output = match config.report.format {
                OutputFormat::Json => report::generate_json_report(&summary)?,
                OutputFormat::Markdown => {
                    report::generate_summary_markdown(&summary, &report_metadata(&dataset))
                }
            };
            emit(&args, &output)?;
            Ok(0)
        }
        Command::Compare { period1, period2 } => {
            let dataset = match load_dataset(&config, analysis::mom::CONTEXT) {
                Ok(dataset) => dataset,
                Err(e) => return fail(e),
            };
            let comparison = match analysis::mom::compare(&dataset, &period1, &period2) {
                Ok(comparison) => comparison,
                Err(e) => return fail(e),
            };

            let output = match config.report.format {
                OutputFormat::Json => report::generate_json_report(&comparison)?,
                OutputFormat::Markdown => {
                    report::generate_mom_markdown(&comparison, &report_metadata(&dataset))
                }
            };
            emit(&args, &output)?;
            Ok(0)
        }
        Command::Call { tool, arguments } => {
            let arguments = match arguments {
                Some(raw) => serde_json::from_str(&raw).context("Invalid tool arguments")?,
                None => serde_json::json!({}),
            };

            let executor = ToolExecutor::new(config.loader());
            let response = executor.execute(&ToolCall::new(tool, arguments));
            let output = serde_json::to_string_pretty(&response.to_value())?;
            emit(&args, &output)?;

            Ok(if response.is_success() { 0 } else { 1 })
        }
        Command::Manifest => {
            let manifest = AgentManifest::from_config(&config.agent);
            emit(&args, &report::generate_json_report(&manifest)?)?;
            Ok(0)
        }
    }
}

/// Report an analysis error to the user. Returns exit code 1.
fn fail(err: AnalysisError) -> Result<i32> {
    error!("{}", err);
    eprintln!("Error: {}", err);
    Ok(1)
}

/// Load the dataset once per command, labelling failures for `context`.
fn load_dataset(config: &Config, context: &'static str) -> Result<Dataset, AnalysisError> {
    config.loader().load().map_err(|e| e.in_context(context))
}

/// Metadata naming the file the analyzed rows came from.
fn report_metadata(dataset: &Dataset) -> ReportMetadata {
    ReportMetadata {
        dataset: dataset.source.clone(),
        generated_at: Utc::now(),
    }
}

/// Write output to --output or stdout.
fn emit(args: &Args, output: &str) -> Result<()> {
    match &args.output {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_report_names_the_loaded_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("step3_data.csv");
        std::fs::write(&path, include_str!("../fixtures/step3_data.csv")).unwrap();

        let mut config = Config::default();
        config.data.candidate_paths = vec![temp_dir.path().join("absent.csv"), path.clone()];

        let dataset = load_dataset(&config, analysis::summary::CONTEXT).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(report_metadata(&dataset).dataset, path);
    }

    #[test]
    fn test_load_dataset_labels_failures() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.csv");
        std::fs::write(&path, "event_month,sessions\n2025-01-01,1\n").unwrap();

        let mut config = Config::default();
        config.data.candidate_paths = vec![path];

        let err = load_dataset(&config, analysis::mom::CONTEXT).unwrap_err();
        assert!(err.to_string().starts_with("Error analyzing MoM data: "));

        config.data.candidate_paths = vec![temp_dir.path().join("absent.csv")];
        assert!(matches!(
            load_dataset(&config, analysis::mom::CONTEXT),
            Err(AnalysisError::DataNotFound { .. })
        ));
    }
}
