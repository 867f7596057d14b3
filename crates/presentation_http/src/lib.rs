//! resa-bridge HTTP presentation layer
//!
//! Exposes CalDAV calendars as a small JSON API under `/a/{calendar}` and
//! serves the booking front-end as static files.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorResponse, set_expose_internal_errors};
pub use middleware::{RequestIdLayer, ValidatedJson, ValidationError};
pub use routes::{create_app, create_router};
pub use state::AppState;
