//! Duration units for elapsed-time reporting.
//!
//! Each unit carries its own label, so reports never have to infer a unit
//! from the textual form of a duration type.

use crate::error::DbgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unit in which an elapsed duration is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// 10^-9 seconds.
    Nanoseconds,
    /// 10^-6 seconds.
    #[default]
    Microseconds,
    /// 10^-3 seconds.
    Milliseconds,
    /// One second.
    Seconds,
    /// 60 seconds.
    Minutes,
    /// 3600 seconds.
    Hours,
}

impl DurationUnit {
    /// Every unit, smallest first.
    pub const ALL: [DurationUnit; 6] = [
        Self::Nanoseconds,
        Self::Microseconds,
        Self::Milliseconds,
        Self::Seconds,
        Self::Minutes,
        Self::Hours,
    ];

    /// Human-readable label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nanoseconds => "nanoseconds",
            Self::Microseconds => "microseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
        }
    }

    /// Length of one unit in nanoseconds.
    #[must_use]
    pub const fn nanos_per_unit(self) -> u128 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60_000_000_000,
            Self::Hours => 3_600_000_000_000,
        }
    }

    /// Express `duration` as a whole number of units.
    ///
    /// Truncates toward zero; saturates at `u64::MAX`.
    #[must_use]
    pub fn count(self, duration: Duration) -> u64 {
        let whole = duration.as_nanos() / self.nanos_per_unit();
        u64::try_from(whole).unwrap_or(u64::MAX)
    }

    /// Build a duration of `count` units.
    #[must_use]
    pub fn to_duration(self, count: u64) -> Duration {
        let nanos = u128::from(count) * self.nanos_per_unit();
        let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
        #[allow(clippy::cast_possible_truncation)]
        let subsec = (nanos % 1_000_000_000) as u32;
        Duration::new(secs, subsec)
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DurationUnit {
    type Err = DbgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ns" | "nanos" | "nanoseconds" => Ok(Self::Nanoseconds),
            "us" | "µs" | "micros" | "microseconds" => Ok(Self::Microseconds),
            "ms" | "millis" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "sec" | "secs" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "mins" | "minutes" => Ok(Self::Minutes),
            "h" | "hr" | "hrs" | "hours" => Ok(Self::Hours),
            other => Err(DbgError::Config(format!("unknown duration unit '{other}'"))),
        }
    }
}
