//! Calendar port for application layer
//!
//! Defines the interface for calendar operations (write, delete, query events).
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{EventId, TimeWindow};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar port errors
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Calendar service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Calendar event as stored on the calendar server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event UID
    pub uid: String,
    /// Event summary
    pub summary: String,
    /// Event description
    pub description: Option<String>,
    /// Start instant
    pub start: DateTime<Utc>,
    /// End instant
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// Create a new calendar event without description
    pub fn new(
        uid: impl Into<String>,
        summary: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            summary: summary.into(),
            description: None,
            start,
            end,
        }
    }

    /// Set the event description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Calendar port trait
///
/// Collections are addressed by their CalDAV name (e.g. `music_test`).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Store an event at `/{collection}/{uid}.ics`, replacing any existing one
    async fn put_event(&self, collection: &str, event: &CalendarEvent)
    -> Result<(), CalendarError>;

    /// Delete the event stored at `/{collection}/{id}.ics`
    async fn delete_event(&self, collection: &str, id: &EventId) -> Result<(), CalendarError>;

    /// Get events overlapping the window
    async fn query_events(
        &self,
        collection: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Check if the calendar service is available
    async fn is_available(&self) -> bool;
}
