//! Event record - the JSON shape exchanged with bridge callers
//!
//! The record mirrors a calendar event but carries the field names the
//! booking front-end uses: the caller's telephone number travels as `tel`
//! and is stored on the server as the event description. The `password`
//! field is accepted and echoed but never forwarded to the calendar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A calendar event as seen by HTTP callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event identifier (iCalendar UID)
    #[serde(default)]
    pub id: String,
    /// Event title (iCalendar SUMMARY)
    #[serde(default)]
    pub title: String,
    /// Event start
    pub start: DateTime<Utc>,
    /// Event end
    pub end: DateTime<Utc>,
    /// Caller telephone number (iCalendar DESCRIPTION)
    #[serde(default, rename = "tel")]
    pub telephone: String,
    /// Unused; kept for wire compatibility
    #[serde(default)]
    pub password: String,
}

impl EventRecord {
    /// Create a record with an empty id, telephone and password
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            start,
            end,
            telephone: String::new(),
            password: String::new(),
        }
    }

    /// Builder: set the identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: set the telephone number
    #[must_use]
    pub fn with_telephone(mut self, telephone: impl Into<String>) -> Self {
        self.telephone = telephone.into();
        self
    }

    /// Builder: set the password field
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Ensure the event does not end before it starts
    pub fn validate_window(&self) -> Result<(), DomainError> {
        if self.end < self.start {
            return Err(DomainError::ValidationError(format!(
                "end {} precedes start {}",
                self.end.to_rfc3339(),
                self.start.to_rfc3339()
            )));
        }
        Ok(())
    }
}
