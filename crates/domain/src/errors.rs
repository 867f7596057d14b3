//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The requested public calendar name has no collection mapping
    #[error("Unknown calendar: {0}")]
    UnknownCalendar(String),

    /// Event identifier is empty or not usable as a resource name
    #[error("Invalid event id: {0}")]
    InvalidEventId(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Date/time parsing error
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}
