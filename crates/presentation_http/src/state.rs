//! Application state shared across handlers

use std::sync::Arc;

use application::EventBridgeService;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Bridge between HTTP callers and the calendar server
    pub bridge: Arc<EventBridgeService>,
}

impl AppState {
    /// Wrap a bridge service
    pub fn new(bridge: EventBridgeService) -> Self {
        Self {
            bridge: Arc::new(bridge),
        }
    }
}
