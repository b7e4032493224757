//! Dataset loader for the marketing event log.
//!
//! The dataset is located by probing an ordered list of candidate paths;
//! the first one that exists wins. Every call reloads from disk.

use crate::error::{AnalysisError, Result};
use crate::models::{Dataset, EventRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LOAD_CONTEXT: &str = "Error loading dataset";

/// Candidate locations probed when nothing else is configured.
pub fn default_candidates() -> Vec<PathBuf> {
    vec![
        "multi_tool_agent/step3_data.csv",
        "step3_data.csv",
        "./step3_data.csv",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// One CSV row as it appears on disk.
#[derive(Debug, Deserialize)]
struct RawRecord {
    event_month: String,
    channel_grouping: String,
    campaign_name: String,
    sessions: u64,
    conversions: u64,
    engagement_rate: f64,
    total_users: u64,
    new_users: u64,
}

impl RawRecord {
    fn into_record(self) -> Result<EventRecord> {
        let event_date = parse_event_month(&self.event_month)?;
        Ok(EventRecord {
            event_date,
            channel_grouping: self.channel_grouping,
            campaign_name: self.campaign_name,
            sessions: self.sessions,
            conversions: self.conversions,
            engagement_rate: self.engagement_rate,
            total_users: self.total_users,
            new_users: self.new_users,
        })
    }
}

/// Loads the dataset from the first existing candidate path.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    candidates: Vec<PathBuf>,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(default_candidates())
    }
}

impl DatasetLoader {
    /// Create a loader over the given candidate paths, probed in order.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Find the first candidate path that is an existing file.
    pub fn locate(&self) -> Result<PathBuf> {
        for path in &self.candidates {
            if path.is_file() {
                debug!("Dataset found at {}", path.display());
                return Ok(path.clone());
            }
            debug!("No dataset at {}", path.display());
        }

        let tried = self
            .candidates()
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(AnalysisError::DataNotFound { tried })
    }

    /// Locate and parse the dataset.
    pub fn load(&self) -> Result<Dataset> {
        let path = self.locate()?;
        let dataset = Dataset {
            records: read_file(&path)?,
            source: path,
        };
        info!("Loaded {} rows from {}", dataset.len(), dataset.source.display());
        if dataset.is_empty() {
            warn!("Dataset {} has a header but no rows", dataset.source.display());
        }

        Ok(dataset)
    }
}

fn read_file(path: &Path) -> Result<Vec<EventRecord>> {
    let file = File::open(path).map_err(|e| {
        AnalysisError::failure(LOAD_CONTEXT, format!("{}: {}", path.display(), e))
    })?;
    read_records(file)
}

/// Parse event records from CSV text with a header row.
///
/// Columns beyond the required eight are ignored.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<EventRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<RawRecord>() {
        let raw = row.map_err(|e| AnalysisError::failure(LOAD_CONTEXT, e))?;
        records.push(raw.into_record()?);
    }

    Ok(records)
}

/// Parse an `event_month` cell.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM`.
pub fn parse_event_month(value: &str) -> Result<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d") {
        return Ok(date);
    }

    Err(AnalysisError::failure(
        LOAD_CONTEXT,
        format!("invalid event_month value: {:?}", value),
    ))
}
