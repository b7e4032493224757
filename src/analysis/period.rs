//! Period string parsing.
//!
//! Accepted shapes, tried in order after trimming and lowercasing:
//!
//! 1. `feb 24` - 3-letter abbreviation and 2-digit year (always 20xx)
//! 2. `march 2025` - full month name and 4-digit year
//! 3. `feb 2024` - 3-letter abbreviation and 4-digit year

use crate::error::{AnalysisError, Result};
use crate::models::YearMonth;
use regex::Regex;
use std::sync::OnceLock;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn short_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([a-z]{3})\s+(\d{2})$").expect("valid regex"))
}

fn full_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([a-z]+)\s+(\d{4})$").expect("valid regex"))
}

fn abbreviated_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([a-z]{3})\s+(\d{4})$").expect("valid regex"))
}

/// Month number (1-based) for a full lowercase month name.
fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

/// Month number (1-based) for a lowercase 3-letter abbreviation.
fn month_from_abbreviation(abbr: &str) -> Option<u32> {
    if abbr.len() != 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| m.starts_with(abbr))
        .map(|i| i as u32 + 1)
}

/// Parse a user-entered period into a calendar month.
///
/// The error carries `input` exactly as given.
pub fn parse_period(input: &str) -> Result<YearMonth> {
    let normalized = input.trim().to_lowercase();

    resolve(&normalized).ok_or_else(|| AnalysisError::UnsupportedPeriodFormat {
        period: input.to_string(),
    })
}

fn resolve(normalized: &str) -> Option<YearMonth> {
    if let Some(caps) = short_year_pattern().captures(normalized) {
        // Two-digit years are always read as 20xx.
        let month = month_from_abbreviation(&caps[1])?;
        let year = 2000 + caps[2].parse::<i32>().ok()?;
        return YearMonth::new(year, month);
    }

    if let Some(caps) = full_name_pattern().captures(normalized) {
        if let Some(month) = month_from_name(&caps[1]) {
            let year = caps[2].parse::<i32>().ok()?;
            return YearMonth::new(year, month);
        }
    }

    if let Some(caps) = abbreviated_pattern().captures(normalized) {
        let month = month_from_abbreviation(&caps[1])?;
        let year = caps[2].parse::<i32>().ok()?;
        return YearMonth::new(year, month);
    }

    None
}
