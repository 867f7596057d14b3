//! Application services

mod event_bridge_service;

pub use event_bridge_service::{BridgeSettings, EventBridgeService};
