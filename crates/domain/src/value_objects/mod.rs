//! Value Objects - Immutable, identity-less domain primitives

mod calendar_routes;
mod event_id;
mod time_window;

pub use calendar_routes::CalendarRoutes;
pub use event_id::EventId;
pub use time_window::{TimeWindow, truncate_to_hour};
