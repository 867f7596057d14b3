//! Query time window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const SECONDS_PER_HOUR: i64 = 3600;

/// Truncate a timestamp down to the start of its UTC hour
#[must_use]
pub fn truncate_to_hour(at: DateTime<Utc>) -> DateTime<Utc> {
    let secs = at.timestamp();
    let floored = secs - secs.rem_euclid(SECONDS_PER_HOUR);
    DateTime::from_timestamp(floored, 0).unwrap_or(at)
}

/// Half-open `[start, end)` range used to query a calendar
///
/// Both bounds are aligned to whole UTC hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window from Unix timestamps in seconds
    pub fn from_unix_seconds(start: i64, end: i64) -> Result<Self, DomainError> {
        let to_datetime = |secs: i64| {
            DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| DomainError::InvalidDateTime(format!("timestamp {secs} out of range")))
        };
        Ok(Self::new(to_datetime(start)?, to_datetime(end)?))
    }

    /// Build a window from two instants, truncating both to the hour
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: truncate_to_hour(start),
            end: truncate_to_hour(end),
        }
    }

    /// Window start (inclusive)
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window end (exclusive)
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
