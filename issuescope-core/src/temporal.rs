//! Date normalization and month bucketing.
//!
//! Every time-based analysis funnels raw [`DateValue`]s through [`normalize`].
//! The three outcomes stay distinct all the way down: a missing date is
//! skipped silently, an invalid one is excluded *and* reported.
//!
//! Valid instants keep the offset they were written with. Elapsed-time math
//! happens in UTC, but month buckets follow the writer's wall clock, so
//! `2024-10-31T23:00:00-05:00` falls in `2024-10`.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::types::DateValue;

/// Offset-less datetime layouts, read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Invalid raw values kept for the diagnostic line.
const MAX_INVALID_EXAMPLES: usize = 3;

/// Outcome of normalizing a raw date value.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    /// A usable instant in the offset it was recorded with
    Valid(DateTime<FixedOffset>),
    /// Present but not a date we accept; carries the raw value for reporting
    Invalid(String),
    Missing,
}

impl Temporal {
    pub fn valid(&self) -> Option<DateTime<Utc>> {
        match self {
            Temporal::Valid(ts) => Some(ts.with_timezone(&Utc)),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Temporal::Invalid(_))
    }

    /// Month bucket in the instant's own offset; only defined for valid instants.
    pub fn month(&self) -> Option<MonthKey> {
        match self {
            Temporal::Valid(ts) => Some(MonthKey::of(ts)),
            _ => None,
        }
    }
}

/// Normalize a raw date value. Never fails.
pub fn normalize(value: &DateValue) -> Temporal {
    match value {
        DateValue::Missing => Temporal::Missing,
        DateValue::Instant(ts) => Temporal::Valid(ts.fixed_offset()),
        DateValue::Text(raw) if raw.trim().is_empty() => Temporal::Missing,
        DateValue::Text(raw) => match parse_text(raw) {
            Some(ts) => Temporal::Valid(ts),
            None => Temporal::Invalid(raw.clone()),
        },
        DateValue::Other(v) => Temporal::Invalid(v.to_string()),
    }
}

/// Parse the accepted textual layouts.
///
/// Accepts RFC 3339 / ISO-8601 with offset, offset-less ISO datetimes (UTC) and
/// bare `YYYY-MM-DD` dates (midnight UTC). Anything else, including
/// slash-separated dates, is rejected.
pub fn parse_text(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(ts);
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Whole days from `from` to `to`, truncated toward zero.
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Approximate month count for a day count (30-day months).
pub fn approx_months(days: i64) -> i64 {
    days / 30
}

// ============================================
// Month buckets
// ============================================

/// Calendar month key, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of<Tz: TimeZone>(ts: &DateTime<Tz>) -> Self {
        Self::new(ts.year(), ts.month())
    }

    /// The following calendar month.
    pub fn succ(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Every month from `start` to `end`, inclusive. Empty if `start > end`.
    pub fn range_inclusive(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
        let mut months = Vec::new();
        let mut current = start;
        while current <= end {
            months.push(current);
            current = current.succ();
        }
        months
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================
// Diagnostics
// ============================================

/// Per-run tally of dates that could not be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateDiagnostics {
    pub missing: usize,
    pub invalid: usize,
    /// First few invalid raw values
    pub examples: Vec<String>,
}

impl DateDiagnostics {
    /// Record an outcome and hand back the instant when it is usable.
    pub fn record(&mut self, temporal: &Temporal) -> Option<DateTime<Utc>> {
        match temporal {
            Temporal::Valid(_) => temporal.valid(),
            Temporal::Missing => {
                self.missing += 1;
                None
            }
            Temporal::Invalid(raw) => {
                self.invalid += 1;
                if self.examples.len() < MAX_INVALID_EXAMPLES {
                    self.examples.push(raw.clone());
                }
                None
            }
        }
    }

    /// Normalize and record in one step.
    pub fn resolve(&mut self, value: &DateValue) -> Option<DateTime<Utc>> {
        self.record(&normalize(value))
    }

    pub fn has_invalid(&self) -> bool {
        self.invalid > 0
    }

    /// One user-facing line about malformed dates, `None` when there were none.
    pub fn invalid_message(&self) -> Option<String> {
        if !self.has_invalid() {
            return None;
        }
        let examples = self
            .examples
            .iter()
            .map(|e| format!("'{}'", e))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!(
            "Warning: {} record(s) with an invalid date were excluded from date-based results ({}).",
            self.invalid, examples
        ))
    }

    /// Emit the invalid-date warning to the log, once.
    pub fn log(&self, analysis: &str) {
        if self.has_invalid() {
            tracing::warn!(
                analysis,
                invalid = self.invalid,
                missing = self.missing,
                examples = ?self.examples,
                "Encountered invalid date values"
            );
        } else if self.missing > 0 {
            tracing::debug!(analysis, missing = self.missing, "Skipped missing dates");
        }
    }
}
