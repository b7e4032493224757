//! Typed group-by and ranking helpers over event records.
//!
//! Groups keep their keys in first-appearance order, and rankings use a
//! stable sort, so ties resolve to the order a key was first seen.
//! Integer sums are checked; an overflow is an analysis failure.

use crate::error::{AnalysisError, Result};
use crate::models::{EventRecord, RankedCampaign};
use std::collections::{HashMap, HashSet};

/// Context label for aggregation failures. Analyzers relabel it.
const CONTEXT: &str = "Error aggregating metrics";

/// Add `value` to `total`, failing instead of wrapping.
fn checked_sum(total: u64, value: u64, metric: &str) -> Result<u64> {
    total
        .checked_add(value)
        .ok_or_else(|| AnalysisError::failure(CONTEXT, format!("{} total overflows", metric)))
}

/// Running totals over a set of event records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTotals {
    pub rows: usize,
    pub sessions: u64,
    pub conversions: u64,
    pub engagement_sum: f64,
    pub total_users: u64,
    pub new_users: u64,
}

impl MetricTotals {
    /// Fold one record into the totals. On overflow the totals are left unchanged.
    pub fn add(&mut self, record: &EventRecord) -> Result<()> {
        let sessions = checked_sum(self.sessions, record.sessions, "sessions")?;
        let conversions = checked_sum(self.conversions, record.conversions, "conversions")?;
        let total_users = checked_sum(self.total_users, record.total_users, "total_users")?;
        let new_users = checked_sum(self.new_users, record.new_users, "new_users")?;

        self.rows += 1;
        self.sessions = sessions;
        self.conversions = conversions;
        self.engagement_sum += record.engagement_rate;
        self.total_users = total_users;
        self.new_users = new_users;
        Ok(())
    }

    /// Totals over every record in `records`.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EventRecord>) -> Result<Self> {
        let mut totals = Self::default();
        for record in records {
            totals.add(record)?;
        }
        Ok(totals)
    }

    /// Mean engagement rate rounded to 4 decimals. Zero when there are no rows.
    pub fn avg_engagement_rate(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        round_to(self.engagement_sum / self.rows as f64, 4)
    }
}

/// Group records by a projected key, folding each group into an accumulator.
///
/// The returned groups are in first-appearance order of their keys. Every
/// group holds at least one record. The first failing fold aborts the grouping.
pub fn group_by<'a, A, K, F>(
    records: impl IntoIterator<Item = &'a EventRecord>,
    key: K,
    mut fold: F,
) -> Result<Vec<(String, A)>>
where
    A: Default,
    K: Fn(&'a EventRecord) -> &'a str,
    F: FnMut(&mut A, &'a EventRecord) -> Result<()>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(String, A)> = Vec::new();

    for record in records {
        let k = key(record);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k.to_string(), A::default()));
            groups.len() - 1
        });
        fold(&mut groups[slot].1, record)?;
    }

    Ok(groups)
}

/// Sum a metric per key, in first-appearance order.
pub fn sum_by<'a, K, V>(
    records: impl IntoIterator<Item = &'a EventRecord>,
    key: K,
    value: V,
) -> Result<Vec<(String, u64)>>
where
    K: Fn(&'a EventRecord) -> &'a str,
    V: Fn(&EventRecord) -> u64,
{
    group_by(records, key, |total: &mut u64, record| {
        *total = checked_sum(*total, value(record), "metric")?;
        Ok(())
    })
}

/// Distinct keys in first-appearance order.
pub fn distinct<'a, K>(records: impl IntoIterator<Item = &'a EventRecord>, key: K) -> Vec<String>
where
    K: Fn(&'a EventRecord) -> &'a str,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .map(key)
        .filter(|k| seen.insert(*k))
        .map(str::to_string)
        .collect()
}

/// Take the `n` largest totals, descending; ties keep their input order.
pub fn top_n(mut totals: Vec<(String, u64)>, n: usize) -> Vec<RankedCampaign> {
    totals.sort_by_key(|(_, value)| std::cmp::Reverse(*value));
    totals.truncate(n);
    totals
        .into_iter()
        .map(|(campaign, value)| RankedCampaign { campaign, value })
        .collect()
}

/// Top `n` campaigns by a summed metric.
pub fn top_campaigns<'a, V>(
    records: impl IntoIterator<Item = &'a EventRecord>,
    value: V,
    n: usize,
) -> Result<Vec<RankedCampaign>>
where
    V: Fn(&EventRecord) -> u64,
{
    let totals = sum_by(records, |r: &'a EventRecord| r.campaign_name.as_str(), value)?;
    Ok(top_n(totals, n))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
