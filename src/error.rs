//! Error types for the analysis tools.
//!
//! Every variant renders to the human-readable `error_message` that the
//! tool boundary hands back to the agent framework.

use thiserror::Error;

/// Errors that can occur while loading or analyzing the dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// None of the candidate dataset paths exist.
    #[error("CSV file not found. Please ensure the dataset is accessible (tried: {tried}).")]
    DataNotFound { tried: String },

    /// A period string matched none of the accepted shapes.
    #[error(
        "Error parsing periods: Unsupported period format: {period}. Please use formats like 'Feb 24', 'March 2025', etc."
    )]
    UnsupportedPeriodFormat { period: String },

    /// A parsed period has no matching rows.
    #[error("No data found for period: {period}")]
    PeriodNotFound { period: String },

    /// Catch-all for unexpected faults during loading or computation.
    #[error("{context}: {message}")]
    AnalysisFailure {
        context: &'static str,
        message: String,
    },
}

impl AnalysisError {
    /// Wrap an arbitrary fault as an `AnalysisFailure` under the given context.
    pub fn failure(context: &'static str, err: impl std::fmt::Display) -> Self {
        AnalysisError::AnalysisFailure {
            context,
            message: err.to_string(),
        }
    }

    /// Re-label an `AnalysisFailure` with the calling tool's context.
    ///
    /// Other variants pass through unchanged.
    pub fn in_context(self, context: &'static str) -> Self {
        match self {
            AnalysisError::AnalysisFailure { message, .. } => {
                AnalysisError::AnalysisFailure { context, message }
            }
            other => other,
        }
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
