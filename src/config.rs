//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mminer.toml` files.

use crate::cli::OutputFormat;
use crate::dataset::{self, DatasetLoader};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".mminer.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dataset settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Agent manifest settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where to look for the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Candidate dataset paths, probed in order; the first existing file wins.
    #[serde(default = "dataset::default_candidates")]
    pub candidate_paths: Vec<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            candidate_paths: dataset::default_candidates(),
        }
    }
}

/// Agent description handed to the agent framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Model the framework should run the agent on.
    #[serde(default = "default_agent_model")]
    pub model: String,

    #[serde(default = "default_agent_description")]
    pub description: String,

    /// System instruction telling the model when to use each tool.
    #[serde(default = "default_agent_instruction")]
    pub instruction: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            model: default_agent_model(),
            description: default_agent_description(),
            instruction: default_agent_instruction(),
        }
    }
}

fn default_agent_name() -> String {
    "marketing_data_agent".to_string()
}

fn default_agent_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_agent_description() -> String {
    "An agent that analyzes marketing campaign data and performs Month-over-Month comparisons"
        .to_string()
}

fn default_agent_instruction() -> String {
    "You are a helpful marketing data analyst. You have access to two main tools:

1. Use the analyze_marketing_data tool when users ask about general marketing data, campaign performance,
   or want overall insights from the data.

2. Use the analyze_mom_data tool when users want to compare marketing performance between two specific periods.
   For MoM analysis, users should specify periods like 'Feb 24 vs Feb 25', 'March 2024 vs March 2025', etc.

Provide clear, helpful explanations of the data insights and highlight key trends and changes."
        .to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if !args.data.is_empty() {
            self.data.candidate_paths = args.data.clone();
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Dataset loader over the configured candidate paths.
    pub fn loader(&self) -> DatasetLoader {
        DatasetLoader::new(self.data.candidate_paths.clone())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
