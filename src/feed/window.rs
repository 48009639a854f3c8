//! Named time windows resolved to absolute cutoff instants.

use std::fmt;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A named relative time range.
///
/// Windows are resolved against an injected "now" instant at scan time,
/// so time-dependent behavior stays deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// Since midnight UTC of the current date.
    #[default]
    Today,

    /// Since midnight UTC of the previous date.
    Yesterday,

    /// The last 60 minutes.
    LastHour,

    /// The last 3 hours.
    LastThreeHours,

    /// No lower bound.
    Unbounded,
}

impl TimeWindow {
    /// Matches a window name exactly, tolerating `-`/`_` separators and
    /// case differences. Returns `None` for unrecognized names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "today" => Some(Self::Today),
            "yesterday" => Some(Self::Yesterday),
            "last hour" => Some(Self::LastHour),
            "last 3 hours" | "last three hours" => Some(Self::LastThreeHours),
            "all" | "unbounded" => Some(Self::Unbounded),
            _ => None,
        }
    }

    /// Parses a window name permissively: unrecognized names resolve to
    /// [`TimeWindow::Unbounded`] rather than an error.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::Unbounded)
    }

    /// Resolves the window to an absolute cutoff instant, or `None` when
    /// the window has no lower bound.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Today => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            Self::Yesterday => {
                let yesterday = now - TimeDelta::days(1);
                Some(yesterday.date_naive().and_time(NaiveTime::MIN).and_utc())
            }
            Self::LastHour => Some(now - TimeDelta::hours(1)),
            Self::LastThreeHours => Some(now - TimeDelta::hours(3)),
            Self::Unbounded => None,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::LastHour => "last hour",
            Self::LastThreeHours => "last 3 hours",
            Self::Unbounded => "unbounded",
        };
        write!(f, "{name}")
    }
}
