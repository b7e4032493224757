//! Markdown and JSON report generation.
//!
//! This module renders analyzer results for the command line.

use crate::models::{
    Change, MarketingSummary, MomComparison, PeriodMetrics, RankedCampaign,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Where and when a report was produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Dataset file the numbers came from.
    pub dataset: PathBuf,
    pub generated_at: DateTime<Utc>,
}

/// Generate the Markdown report for the dataset summary.
pub fn generate_summary_markdown(summary: &MarketingSummary, metadata: &ReportMetadata) -> String {
    let mut output = String::new();

    output.push_str("# Marketing Data Report\n\n");
    output.push_str(&generate_metadata_section(metadata));

    let overview = &summary.dataset_overview;
    output.push_str("## Dataset Overview\n\n");
    output.push_str(&format!("- **Rows:** {}\n", overview.total_rows));
    output.push_str(&format!("- **Date Range:** {}\n", overview.date_range));
    output.push_str(&format!("- **Channels:** {}\n", overview.unique_channels.join(", ")));
    output.push_str(&format!("- **Campaigns:** {}\n\n", overview.total_campaigns));

    let overall = &summary.overall_metrics;
    output.push_str("## Overall Metrics\n\n");
    output.push_str("| Sessions | Conversions | Avg. Engagement Rate |\n");
    output.push_str("|:---:|:---:|:---:|\n");
    output.push_str(&format!(
        "| {} | {} | {} |\n\n",
        overall.total_sessions,
        overall.total_conversions,
        format_rate(overall.average_engagement_rate)
    ));

    output.push_str(&generate_ranking_section(
        "Top Campaigns by Sessions",
        "Sessions",
        &summary.top_campaigns_by_sessions,
    ));
    output.push_str(&generate_ranking_section(
        "Top Campaigns by Conversions",
        "Conversions",
        &summary.top_campaigns_by_conversions,
    ));

    output.push_str("## Channel Performance\n\n");
    output.push_str("| Channel | Sessions | Conversions | Avg. Engagement Rate |\n");
    output.push_str("|:---|:---:|:---:|:---:|\n");
    for (channel, perf) in &summary.channel_performance {
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            channel,
            perf.sessions,
            perf.conversions,
            format_rate(perf.avg_engagement_rate)
        ));
    }
    output.push('\n');

    output
}

/// Generate the Markdown report for a month-over-month comparison.
pub fn generate_mom_markdown(comparison: &MomComparison, metadata: &ReportMetadata) -> String {
    let mut output = String::new();
    let summary = &comparison.comparison_summary;
    let (p1, p2) = (&summary.period1, &summary.period2);
    let changes = &summary.mom_changes;

    output.push_str(&format!(
        "# Month-over-Month Report: {} vs {}\n\n",
        p1.period, p2.period
    ));
    output.push_str(&generate_metadata_section(metadata));

    output.push_str("## Comparison\n\n");
    output.push_str(&format!("| Metric | {} | {} | Change |\n", p1.period, p2.period));
    output.push_str("|:---|:---:|:---:|:---:|\n");
    output.push_str(&comparison_row(
        "Sessions",
        p1.total_sessions.to_string(),
        p2.total_sessions.to_string(),
        changes.sessions_change_pct,
    ));
    output.push_str(&comparison_row(
        "Conversions",
        p1.total_conversions.to_string(),
        p2.total_conversions.to_string(),
        changes.conversions_change_pct,
    ));
    output.push_str(&comparison_row(
        "Avg. Engagement Rate",
        format_rate(p1.avg_engagement_rate),
        format_rate(p2.avg_engagement_rate),
        changes.engagement_rate_change_pct,
    ));
    output.push_str(&comparison_row(
        "Users",
        p1.total_users.to_string(),
        p2.total_users.to_string(),
        changes.users_change_pct,
    ));
    output.push_str(&comparison_row(
        "New Users",
        p1.total_new_users.to_string(),
        p2.total_new_users.to_string(),
        changes.new_users_change_pct,
    ));
    output.push_str(&format!(
        "| Campaigns | {} | {} | |\n\n",
        p1.unique_campaigns, p2.unique_campaigns
    ));

    let insights = &comparison.insights;
    output.push_str("## Insights\n\n");
    output.push_str(&format!("- Sessions {}\n", insights.sessions_trend));
    output.push_str(&format!("- Conversions {}\n", insights.conversions_trend));
    output.push_str(&format!("- Engagement {}\n\n", insights.engagement_trend));

    for metrics in [p1, p2] {
        output.push_str(&generate_channel_breakdown(metrics));
    }

    for (period, campaigns) in &comparison.top_campaigns.entries {
        output.push_str(&generate_ranking_section(
            &format!("Top Campaigns: {}", period),
            "Sessions",
            campaigns,
        ));
    }

    output
}

/// Serialize any result as pretty JSON.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset.display()));
    section.push_str(&format!(
        "- **Generated:** {}\n\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    section
}

fn generate_ranking_section(title: &str, label: &str, campaigns: &[RankedCampaign]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));
    if campaigns.is_empty() {
        section.push_str("No campaigns.\n\n");
        return section;
    }

    section.push_str(&format!("| # | Campaign | {} |\n", label));
    section.push_str("|:---:|:---|:---:|\n");
    for (i, campaign) in campaigns.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            campaign.campaign,
            campaign.value
        ));
    }
    section.push('\n');

    section
}

fn generate_channel_breakdown(metrics: &PeriodMetrics) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Sessions by Channel: {}\n\n", metrics.period));
    section.push_str("| Channel | Sessions |\n");
    section.push_str("|:---|:---:|\n");
    for (channel, sessions) in &metrics.channel_breakdown {
        section.push_str(&format!("| {} | {} |\n", channel, sessions));
    }
    section.push('\n');

    section
}

fn comparison_row(metric: &str, value1: String, value2: String, change: Change) -> String {
    format!("| {} | {} | {} | {} |\n", metric, value1, value2, format_change(change))
}

/// Percent changes get a sign and a `%`; sentinels print as-is.
fn format_change(change: Change) -> String {
    match change {
        Change::Percent(p) if p > 0.0 => format!("+{:.2}%", p),
        Change::Percent(p) => format!("{:.2}%", p),
        other => other.to_string(),
    }
}

fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{mom, summary};
    use crate::models::Dataset;

    const SAMPLE: &str = include_str!("../../fixtures/step3_data.csv");

    fn sample() -> Dataset {
        Dataset {
            source: PathBuf::from("step3_data.csv"),
            records: crate::dataset::read_records(SAMPLE.as_bytes()).unwrap(),
        }
    }

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            dataset: PathBuf::from("step3_data.csv"),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_summary_markdown() {
        let summary = summary::summarize(&sample()).unwrap();
        let markdown = generate_summary_markdown(&summary, &metadata());

        assert!(markdown.contains("# Marketing Data Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("`step3_data.csv`"));
        assert!(markdown.contains("2025-01-01 to 2025-02-01"));
        assert!(markdown.contains("| 1 | (organic) | 3800 |"));
        assert!(markdown.contains("| Paid Search | 4400 | 158 | 59.75% |"));
    }

    #[test]
    fn test_generate_mom_markdown() {
        let comparison = mom::compare(&sample(), "Jan 25", "Feb 25").unwrap();
        let markdown = generate_mom_markdown(&comparison, &metadata());

        assert!(markdown.contains("# Month-over-Month Report: Jan 25 vs Feb 25"));
        assert!(markdown.contains("| Sessions | 4400 | 5100 | -13.73% |"));
        assert!(markdown.contains("- Engagement improved"));
        assert!(markdown.contains("## Top Campaigns: Feb 25"));
        assert!(markdown.contains("## Sessions by Channel: Jan 25"));
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(Change::Percent(15.91)), "+15.91%");
        assert_eq!(format_change(Change::Percent(-2.5)), "-2.50%");
        assert_eq!(format_change(Change::NotAvailable), "N/A");
        assert_eq!(format_change(Change::Infinite), "∞");
    }

    #[test]
    fn test_generate_json_report() {
        let summary = summary::summarize(&sample()).unwrap();
        let json = generate_json_report(&summary).unwrap();

        assert!(json.contains("\"dataset_overview\""));
        assert!(json.contains("\"channel_performance\""));
    }
}
