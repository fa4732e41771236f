//! Analytics time ranges and reports.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A fixed-length analytics window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// The last 24 hours.
    Day,
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
    /// The last 90 days.
    Quarter,
    /// The last 365 days.
    Year,
}

impl TimeRange {
    /// Returns the window length.
    pub fn duration(self) -> Duration {
        match self {
            TimeRange::Day => Duration::days(1),
            TimeRange::Week => Duration::days(7),
            TimeRange::Month => Duration::days(30),
            TimeRange::Quarter => Duration::days(90),
            TimeRange::Year => Duration::days(365),
        }
    }

    /// Returns the `[start, end)` window ending at `end`.
    pub fn window(self, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (end - self.duration(), end)
    }

    /// Returns the equal-length window immediately preceding [`Self::window`].
    pub fn previous_window(self, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = end - self.duration();
        (start - self.duration(), start)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRange::Day => write!(f, "day"),
            TimeRange::Week => write!(f, "week"),
            TimeRange::Month => write!(f, "month"),
            TimeRange::Quarter => write!(f, "quarter"),
            TimeRange::Year => write!(f, "year"),
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            _ => Err(format!("unknown time range: {}", s)),
        }
    }
}

/// One point in a per-day creation timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// The day, formatted `YYYY-MM-DD`.
    pub date: String,

    /// Number of records created on that day.
    pub count: u64,
}

/// Creation analytics for one collection over a time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Number of records created within the window.
    pub total: u64,

    /// Growth relative to the preceding equal-length window, in percent.
    /// Zero when the preceding window was empty.
    pub growth_percent: f64,

    /// Creation counts keyed by category.
    pub by_category: BTreeMap<String, u64>,

    /// Creation counts keyed by status.
    pub by_status: BTreeMap<String, u64>,

    /// Per-day creation counts, sorted ascending by date string.
    pub timeline: Vec<TimelinePoint>,
}

impl AnalyticsReport {
    /// Returns an all-zero report for an empty window.
    pub fn empty() -> Self {
        Self {
            total: 0,
            growth_percent: 0.0,
            by_category: BTreeMap::new(),
            by_status: BTreeMap::new(),
            timeline: Vec::new(),
        }
    }

    /// Computes the growth percentage, guarding against an empty previous
    /// window.
    pub fn growth(total: u64, previous_total: u64) -> f64 {
        if previous_total == 0 {
            0.0
        } else {
            (total as f64 - previous_total as f64) / previous_total as f64 * 100.0
        }
    }
}
