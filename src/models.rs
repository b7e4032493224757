//! Data models for the marketing analysis tools.
//!
//! This module contains the event records loaded from the dataset and
//! the result payloads produced by the analyzers.

use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A calendar month, the granularity every period comparison works at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
}

impl YearMonth {
    /// Creates a new year/month, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// First day of the month.
    #[allow(dead_code)] // Used when rendering periods back to text
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One row of the marketing dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Date the row was recorded against; only its month is significant.
    pub event_date: NaiveDate,
    pub channel_grouping: String,
    pub campaign_name: String,
    pub sessions: u64,
    pub conversions: u64,
    /// Fraction in [0, 1].
    pub engagement_rate: f64,
    pub total_users: u64,
    pub new_users: u64,
}

impl EventRecord {
    /// Calendar month of the event.
    pub fn month(&self) -> YearMonth {
        YearMonth::from(self.event_date)
    }
}

/// An ordered collection of event records loaded from a single file.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// File the records were read from.
    pub source: PathBuf,
    pub records: Vec<EventRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose event month equals `month`, in dataset order.
    pub fn in_month(&self, month: YearMonth) -> Vec<&EventRecord> {
        self.records.iter().filter(|r| r.month() == month).collect()
    }
}

/// A campaign and its summed metric, as used in top-N rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCampaign {
    pub campaign: String,
    pub value: u64,
}

/// High-level facts about the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_rows: usize,
    /// "<min> to <max>" over event dates.
    pub date_range: String,
    /// Channel groupings in first-appearance order.
    pub unique_channels: Vec<String>,
    pub total_campaigns: usize,
}

/// Dataset-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub total_sessions: u64,
    pub total_conversions: u64,
    pub average_engagement_rate: f64,
}

/// Per-channel performance summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub sessions: u64,
    pub conversions: u64,
    pub avg_engagement_rate: f64,
}

/// Output of the aggregate analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingSummary {
    pub dataset_overview: DatasetOverview,
    pub overall_metrics: OverallMetrics,
    pub top_campaigns_by_sessions: Vec<RankedCampaign>,
    pub top_campaigns_by_conversions: Vec<RankedCampaign>,
    /// Keyed by channel grouping.
    pub channel_performance: BTreeMap<String, ChannelSummary>,
}

/// Aggregates over the rows of one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodMetrics {
    /// The period string exactly as the caller supplied it.
    pub period: String,
    pub total_sessions: u64,
    pub total_conversions: u64,
    pub avg_engagement_rate: f64,
    pub total_users: u64,
    pub total_new_users: u64,
    pub unique_campaigns: usize,
    /// Session totals keyed by channel grouping.
    pub channel_breakdown: BTreeMap<String, u64>,
}

/// A percentage change between two values.
///
/// Serializes as a bare number, or as the `"N/A"` / `"∞"` sentinel
/// strings when the baseline is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    /// Percentage, rounded to 2 decimals.
    Percent(f64),
    /// Both values were zero.
    NotAvailable,
    /// Only the baseline was zero.
    Infinite,
}

impl Change {
    pub const NOT_AVAILABLE: &'static str = "N/A";
    pub const INFINITE: &'static str = "∞";
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Percent(p) => write!(f, "{}", p),
            Change::NotAvailable => write!(f, "{}", Self::NOT_AVAILABLE),
            Change::Infinite => write!(f, "{}", Self::INFINITE),
        }
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Change::Percent(p) => serializer.serialize_f64(*p),
            Change::NotAvailable => serializer.serialize_str(Self::NOT_AVAILABLE),
            Change::Infinite => serializer.serialize_str(Self::INFINITE),
        }
    }
}

/// Month-over-month deltas, period1 relative to period2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomChanges {
    pub sessions_change_pct: Change,
    pub conversions_change_pct: Change,
    pub engagement_rate_change_pct: Change,
    pub users_change_pct: Change,
    pub new_users_change_pct: Change,
}

/// Qualitative direction of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increased,
    Decreased,
    Improved,
    Declined,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Increased => write!(f, "increased"),
            Trend::Decreased => write!(f, "decreased"),
            Trend::Improved => write!(f, "improved"),
            Trend::Declined => write!(f, "declined"),
        }
    }
}

/// Trend labels derived from the deltas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub sessions_trend: Trend,
    pub conversions_trend: Trend,
    pub engagement_trend: Trend,
}

/// Both periods' metrics and their deltas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub period1: PeriodMetrics,
    pub period2: PeriodMetrics,
    pub mom_changes: MomChanges,
}

/// Top campaigns per period, keyed by the caller's period strings.
///
/// Serializes as a JSON object in insertion order. A repeated key is
/// written once, since equal period strings select the same rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodRankings {
    pub entries: Vec<(String, Vec<RankedCampaign>)>,
}

impl PeriodRankings {
    #[allow(dead_code)] // Lookup helper for callers holding the typed result
    pub fn get(&self, period: &str) -> Option<&[RankedCampaign]> {
        self.entries
            .iter()
            .find(|(key, _)| key == period)
            .map(|(_, campaigns)| campaigns.as_slice())
    }
}

impl Serialize for PeriodRankings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut written: Vec<&str> = Vec::new();
        let mut map = serializer.serialize_map(None)?;
        for (period, campaigns) in &self.entries {
            if written.contains(&period.as_str()) {
                continue;
            }
            map.serialize_entry(period, campaigns)?;
            written.push(period);
        }
        map.end()
    }
}

/// Output of the MoM comparator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomComparison {
    pub comparison_summary: ComparisonSummary,
    pub top_campaigns: PeriodRankings,
    pub insights: Insights,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_month_rejects_bad_month() {
        assert!(YearMonth::new(2025, 0).is_none());
        assert!(YearMonth::new(2025, 13).is_none());
        assert_eq!(YearMonth::new(2025, 2).map(|m| m.to_string()), Some("2025-02".to_string()));
    }

    #[test]
    fn test_year_month_ordering() {
        let jan = YearMonth { year: 2025, month: 1 };
        let dec = YearMonth { year: 2024, month: 12 };
        assert!(dec < jan);
    }

    #[test]
    fn test_change_serialization() {
        assert_eq!(serde_json::to_value(Change::Percent(12.5)).unwrap(), json!(12.5));
        assert_eq!(serde_json::to_value(Change::NotAvailable).unwrap(), json!("N/A"));
        assert_eq!(serde_json::to_value(Change::Infinite).unwrap(), json!("∞"));
    }

    #[test]
    fn test_trend_serialization() {
        assert_eq!(serde_json::to_value(Trend::Improved).unwrap(), json!("improved"));
        assert_eq!(Trend::Decreased.to_string(), "decreased");
    }

    #[test]
    fn test_period_rankings_keep_order_and_skip_repeats() {
        let rankings = PeriodRankings {
            entries: vec![
                (
                    "Mar 25".to_string(),
                    vec![RankedCampaign {
                        campaign: "spring".to_string(),
                        value: 10,
                    }],
                ),
                ("Feb 25".to_string(), vec![]),
                ("Mar 25".to_string(), vec![]),
            ],
        };

        let text = serde_json::to_string(&rankings).unwrap();
        assert_eq!(
            text,
            r#"{"Mar 25":[{"campaign":"spring","value":10}],"Feb 25":[]}"#
        );
        assert_eq!(rankings.get("Mar 25").map(|c| c.len()), Some(1));
        assert!(rankings.get("Apr 25").is_none());
    }
}
