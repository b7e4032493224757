//! Dataset-wide summary statistics.

use crate::analysis::aggregator::{distinct, group_by, top_campaigns, MetricTotals};
use crate::dataset::DatasetLoader;
use crate::error::{AnalysisError, Result};
use crate::models::{
    ChannelSummary, Dataset, DatasetOverview, EventRecord, MarketingSummary, OverallMetrics,
};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Context label for failures raised while summarizing.
pub const CONTEXT: &str = "Error analyzing data";

/// Number of campaigns in each ranking.
pub const TOP_CAMPAIGNS: usize = 5;

/// Load the dataset and summarize it.
pub fn analyze_marketing_data(loader: &DatasetLoader) -> Result<MarketingSummary> {
    let dataset = loader.load().map_err(|e| e.in_context(CONTEXT))?;
    summarize(&dataset)
}

/// Compute overview, totals, rankings and per-channel performance.
pub fn summarize(dataset: &Dataset) -> Result<MarketingSummary> {
    let records = &dataset.records;
    let Some((first, last)) = date_bounds(records) else {
        return Err(AnalysisError::failure(CONTEXT, "dataset contains no rows"));
    };
    let relabel = |e: AnalysisError| e.in_context(CONTEXT);

    let totals = MetricTotals::from_records(records).map_err(relabel)?;

    let overview = DatasetOverview {
        total_rows: records.len(),
        date_range: format!("{} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
        unique_channels: distinct(records, |r| r.channel_grouping.as_str()),
        total_campaigns: distinct(records, |r| r.campaign_name.as_str()).len(),
    };

    let channel_performance = group_by(records, |r| r.channel_grouping.as_str(), MetricTotals::add)
        .map_err(relabel)?
        .into_iter()
        .map(|(channel, t)| {
            let summary = ChannelSummary {
                sessions: t.sessions,
                conversions: t.conversions,
                avg_engagement_rate: t.avg_engagement_rate(),
            };
            (channel, summary)
        })
        .collect();

    let summary = MarketingSummary {
        dataset_overview: overview,
        overall_metrics: OverallMetrics {
            total_sessions: totals.sessions,
            total_conversions: totals.conversions,
            average_engagement_rate: totals.avg_engagement_rate(),
        },
        top_campaigns_by_sessions: top_campaigns(records, |r| r.sessions, TOP_CAMPAIGNS)
            .map_err(relabel)?,
        top_campaigns_by_conversions: top_campaigns(records, |r| r.conversions, TOP_CAMPAIGNS)
            .map_err(relabel)?,
        channel_performance,
    };

    info!(
        "Summarized {} rows across {} channels",
        summary.dataset_overview.total_rows,
        summary.dataset_overview.unique_channels.len()
    );
    debug!("Summary: {:?}", summary.overall_metrics);

    Ok(summary)
}

/// Earliest and latest event dates, `None` for no records.
fn date_bounds(records: &[EventRecord]) -> Option<(NaiveDate, NaiveDate)> {
    records.iter().map(|r| r.event_date).fold(None, |bounds, date| match bounds {
        None => Some((date, date)),
        Some((first, last)) => Some((first.min(date), last.max(date))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::record;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SAMPLE: &str = include_str!("../../fixtures/step3_data.csv");

    fn dataset(records: Vec<EventRecord>) -> Dataset {
        Dataset {
            source: PathBuf::from("memory.csv"),
            records,
        }
    }

    fn sample_loader(dir: &TempDir) -> DatasetLoader {
        let path = dir.path().join("step3_data.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        DatasetLoader::new(vec![path])
    }

    #[test]
    fn test_summarize_sample_fixture() {
        let temp_dir = TempDir::new().unwrap();
        let summary = analyze_marketing_data(&sample_loader(&temp_dir)).unwrap();

        let overview = &summary.dataset_overview;
        assert_eq!(overview.total_rows, 9);
        assert_eq!(overview.date_range, "2025-01-01 to 2025-02-01");
        assert_eq!(
            overview.unique_channels,
            vec!["Paid Search", "Organic Search", "Email", "Social"]
        );
        assert_eq!(overview.total_campaigns, 6);

        assert_eq!(summary.overall_metrics.total_sessions, 9500);
        assert_eq!(summary.overall_metrics.total_conversions, 281);
        assert_eq!(summary.overall_metrics.average_engagement_rate, 0.6222);

        let by_sessions: Vec<_> = summary
            .top_campaigns_by_sessions
            .iter()
            .map(|c| (c.campaign.as_str(), c.value))
            .collect();
        assert_eq!(
            by_sessions,
            vec![
                ("(organic)", 3800),
                ("brand_search", 2700),
                ("spring_launch", 1700),
                ("newsletter_feb", 600),
                ("newsletter_jan", 400),
            ]
        );

        assert_eq!(summary.top_campaigns_by_conversions[0].campaign, "brand_search");
        assert_eq!(summary.top_campaigns_by_conversions[0].value, 108);

        let paid = &summary.channel_performance["Paid Search"];
        assert_eq!(paid.sessions, 4400);
        assert_eq!(paid.conversions, 158);
        assert_eq!(paid.avg_engagement_rate, 0.5975);
        assert_eq!(summary.channel_performance.len(), 4);
    }

    #[test]
    fn test_top_five_limit_and_tie_order() {
        let records = vec![
            record((2025, 1), "Email", "c1", 10, 0, 0.5),
            record((2025, 1), "Email", "c2", 10, 0, 0.5),
            record((2025, 1), "Email", "c3", 10, 0, 0.5),
            record((2025, 1), "Email", "c4", 10, 0, 0.5),
            record((2025, 1), "Email", "c5", 10, 0, 0.5),
            record((2025, 1), "Email", "c6", 10, 0, 0.5),
        ];
        let summary = summarize(&dataset(records)).unwrap();

        let names: Vec<_> = summary
            .top_campaigns_by_sessions
            .iter()
            .map(|c| c.campaign.as_str())
            .collect();
        assert_eq!(names, vec!["c1", "c2", "c3", "c4", "c5"]);
    }

    #[test]
    fn test_channel_sessions_equal_campaign_sessions() {
        let records = read_sample();
        let summary = summarize(&dataset(records.clone())).unwrap();

        for (channel, perf) in &summary.channel_performance {
            let expected: u64 = records
                .iter()
                .filter(|r| &r.channel_grouping == channel)
                .map(|r| r.sessions)
                .sum();
            assert_eq!(perf.sessions, expected);
        }
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let temp_dir = TempDir::new().unwrap();
        let loader = sample_loader(&temp_dir);

        let first = analyze_marketing_data(&loader).unwrap();
        let second = analyze_marketing_data(&loader).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_dataset_is_failure() {
        let err = summarize(&dataset(Vec::new())).unwrap_err();
        assert_eq!(err.to_string(), "Error analyzing data: dataset contains no rows");
    }

    #[test]
    fn test_session_overflow_is_failure() {
        let records = crate::dataset::read_records(
            "event_month,channel_grouping,campaign_name,sessions,conversions,engagement_rate,total_users,new_users\n\
             2025-01-01,Email,a,18446744073709551615,0,0.5,1,1\n\
             2025-01-01,Email,b,1,0,0.5,1,1\n"
                .as_bytes(),
        )
        .unwrap();

        let err = summarize(&dataset(records)).unwrap_err();
        assert_eq!(err.to_string(), "Error analyzing data: sessions total overflows");
    }

    #[test]
    fn test_every_channel_is_reported() {
        let records = vec![
            record((2025, 1), "Email", "a", 0, 0, 0.0),
            record((2025, 1), "Social", "b", 5, 1, 0.4),
        ];
        let summary = summarize(&dataset(records)).unwrap();

        assert_eq!(summary.channel_performance.len(), 2);
        assert_eq!(summary.channel_performance["Email"].avg_engagement_rate, 0.0);
        assert_eq!(summary.dataset_overview.date_range, "2025-01-01 to 2025-01-01");
    }

    #[test]
    fn test_missing_file_is_data_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let loader = DatasetLoader::new(vec![temp_dir.path().join("absent.csv")]);
        assert!(matches!(
            analyze_marketing_data(&loader),
            Err(AnalysisError::DataNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_row_reports_analysis_context() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "event_month,channel_grouping,campaign_name,sessions,conversions,engagement_rate,total_users,new_users\n\
             2025-01-01,Email,a,lots,0,0.5,1,1\n",
        )
        .unwrap();

        let err = analyze_marketing_data(&DatasetLoader::new(vec![path])).unwrap_err();
        assert!(err.to_string().starts_with("Error analyzing data: "));
    }

    fn read_sample() -> Vec<EventRecord> {
        crate::dataset::read_records(SAMPLE.as_bytes()).unwrap()
    }
}
