//! CalDAV integration
//!
//! Client for CalDAV servers (Baïkal, Radicale, Nextcloud): stores, deletes
//! and queries VEVENT resources inside calendar collections.

pub mod client;
pub mod event;

pub use client::{CalDavClient, CalDavConfig, CalDavError, HttpCalDavClient};
pub use event::CalendarEvent;
