//! Application layer - Use cases and orchestration
//!
//! Translates bridge requests into calendar operations through the
//! `CalendarPort`, which adapters in the infrastructure layer implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
