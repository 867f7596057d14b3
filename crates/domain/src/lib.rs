//! Domain layer for resa-bridge
//!
//! Contains the event record exchanged with HTTP callers, the calendar
//! routing table, and the value objects that shape CalDAV requests.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
