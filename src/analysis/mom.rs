//! Month-over-month comparison of two periods.
//!
//! Deltas are expressed as period1 relative to period2:
//! `(value1 - value2) / value2 * 100`.

use crate::analysis::aggregator::{distinct, round_to, sum_by, top_campaigns, MetricTotals};
use crate::analysis::period::parse_period;
use crate::dataset::DatasetLoader;
use crate::error::{AnalysisError, Result};
use crate::models::{
    Change, ComparisonSummary, Dataset, EventRecord, Insights, MomChanges, MomComparison,
    PeriodMetrics, PeriodRankings, Trend,
};
use tracing::{debug, info};

/// Context label for failures raised while comparing.
pub const CONTEXT: &str = "Error analyzing MoM data";

/// Number of campaigns ranked per period.
pub const TOP_CAMPAIGNS: usize = 3;

/// Load the dataset and compare `period1` against `period2`.
pub fn analyze_mom_data(
    loader: &DatasetLoader,
    period1: &str,
    period2: &str,
) -> Result<MomComparison> {
    let dataset = loader.load().map_err(|e| e.in_context(CONTEXT))?;
    compare(&dataset, period1, period2)
}

/// Compare two periods of an already loaded dataset.
pub fn compare(dataset: &Dataset, period1: &str, period2: &str) -> Result<MomComparison> {
    let month1 = parse_period(period1)?;
    let month2 = parse_period(period2)?;
    debug!("Comparing {} ({}) with {} ({})", period1, month1, period2, month2);

    let rows1 = dataset.in_month(month1);
    if rows1.is_empty() {
        return Err(AnalysisError::PeriodNotFound {
            period: period1.to_string(),
        });
    }

    let rows2 = dataset.in_month(month2);
    if rows2.is_empty() {
        return Err(AnalysisError::PeriodNotFound {
            period: period2.to_string(),
        });
    }

    let metrics1 = period_metrics(period1, &rows1)?;
    let metrics2 = period_metrics(period2, &rows2)?;

    let mom_changes = MomChanges {
        sessions_change_pct: calculate_change(
            metrics1.total_sessions as f64,
            metrics2.total_sessions as f64,
        ),
        conversions_change_pct: calculate_change(
            metrics1.total_conversions as f64,
            metrics2.total_conversions as f64,
        ),
        engagement_rate_change_pct: calculate_change(
            metrics1.avg_engagement_rate,
            metrics2.avg_engagement_rate,
        ),
        users_change_pct: calculate_change(
            metrics1.total_users as f64,
            metrics2.total_users as f64,
        ),
        new_users_change_pct: calculate_change(
            metrics1.total_new_users as f64,
            metrics2.total_new_users as f64,
        ),
    };

    let insights = Insights {
        sessions_trend: trend(
            "sessions",
            mom_changes.sessions_change_pct,
            Trend::Increased,
            Trend::Decreased,
        )?,
        conversions_trend: trend(
            "conversions",
            mom_changes.conversions_change_pct,
            Trend::Increased,
            Trend::Decreased,
        )?,
        engagement_trend: trend(
            "engagement rate",
            mom_changes.engagement_rate_change_pct,
            Trend::Improved,
            Trend::Declined,
        )?,
    };

    let relabel = |e: AnalysisError| e.in_context(CONTEXT);
    let top_campaigns = PeriodRankings {
        entries: vec![
            (
                period1.to_string(),
                top_campaigns(rows1.iter().copied(), |r| r.sessions, TOP_CAMPAIGNS)
                    .map_err(relabel)?,
            ),
            (
                period2.to_string(),
                top_campaigns(rows2.iter().copied(), |r| r.sessions, TOP_CAMPAIGNS)
                    .map_err(relabel)?,
            ),
        ],
    };

    info!(
        "MoM {} vs {}: sessions {}, conversions {}",
        period1, period2, mom_changes.sessions_change_pct, mom_changes.conversions_change_pct
    );

    Ok(MomComparison {
        comparison_summary: ComparisonSummary {
            period1: metrics1,
            period2: metrics2,
            mom_changes,
        },
        top_campaigns,
        insights,
    })
}

/// Aggregate the rows of one period. The period must have at least one row.
pub fn period_metrics(period: &str, rows: &[&EventRecord]) -> Result<PeriodMetrics> {
    if rows.is_empty() {
        return Err(AnalysisError::PeriodNotFound {
            period: period.to_string(),
        });
    }
    let relabel = |e: AnalysisError| e.in_context(CONTEXT);

    let totals = MetricTotals::from_records(rows.iter().copied()).map_err(relabel)?;
    let unique_campaigns = distinct(rows.iter().copied(), |r| r.campaign_name.as_str()).len();
    let channel_breakdown = sum_by(
        rows.iter().copied(),
        |r| r.channel_grouping.as_str(),
        |r| r.sessions,
    )
    .map_err(relabel)?
    .into_iter()
    .collect();

    Ok(PeriodMetrics {
        period: period.to_string(),
        total_sessions: totals.sessions,
        total_conversions: totals.conversions,
        avg_engagement_rate: totals.avg_engagement_rate(),
        total_users: totals.total_users,
        total_new_users: totals.new_users,
        unique_campaigns,
        channel_breakdown,
    })
}

/// Percentage change of `current` relative to `baseline`, to 2 decimals.
///
/// A zero baseline yields `NotAvailable` when both are zero and
/// `Infinite` otherwise.
pub fn calculate_change(current: f64, baseline: f64) -> Change {
    if baseline == 0.0 {
        return if current == 0.0 {
            Change::NotAvailable
        } else {
            Change::Infinite
        };
    }
    Change::Percent(round_to((current - baseline) / baseline * 100.0, 2))
}

/// Label a change. `NotAvailable` and non-positive changes get the
/// negative label. An `Infinite` change has no label and fails the comparison.
fn trend(metric: &str, change: Change, positive: Trend, negative: Trend) -> Result<Trend> {
    match change {
        Change::Percent(p) if p > 0.0 => Ok(positive),
        Change::Percent(_) | Change::NotAvailable => Ok(negative),
        Change::Infinite => Err(AnalysisError::failure(
            CONTEXT,
            format!(
                "cannot label the {} trend: change from a zero baseline is {}",
                metric,
                Change::INFINITE
            ),
        )),
    }
}
