//! Event identifier used as both iCalendar UID and resource name

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Identifier of an event stored in a CalDAV collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Parse an identifier received from a caller
    ///
    /// The id becomes a path segment (`{id}.ics`), so it must be non-empty
    /// and must not contain path separators or parent references.
    pub fn parse(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty()
            || trimmed.contains('/')
            || trimmed.contains('\\')
            || trimmed.contains("..")
        {
            return Err(DomainError::InvalidEventId(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive the identifier of a new event from its start time
    ///
    /// Produces `{prefix}-{unix seconds}`; two events starting in the same
    /// second of the same calendar share an id and the later one replaces
    /// the earlier.
    #[must_use]
    pub fn for_start(prefix: &str, start: DateTime<Utc>) -> Self {
        Self(format!("{prefix}-{}", start.timestamp()))
    }

    /// Borrow as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}
