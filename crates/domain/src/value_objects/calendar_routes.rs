//! Calendar routing table
//!
//! Maps the public calendar names used in `/a/{calendar}` to the CalDAV
//! collection that stores their events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Public calendar name to CalDAV collection mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarRoutes(BTreeMap<String, String>);

impl CalendarRoutes {
    /// Resolve a public calendar name to its collection
    pub fn resolve(&self, calendar: &str) -> Result<&str, DomainError> {
        self.0
            .get(calendar)
            .map(String::as_str)
            .ok_or_else(|| DomainError::UnknownCalendar(calendar.to_string()))
    }

    /// Iterate over `(calendar, collection)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of routed calendars
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no calendars are routed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CalendarRoutes {
    fn default() -> Self {
        [
            ("music", "music_test"),
            ("live-perf", "live-perf_test"),
            ("ja-events", "ja-events_test"),
            ("redbox", "red-box_test"),
        ]
        .into_iter()
        .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CalendarRoutes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
