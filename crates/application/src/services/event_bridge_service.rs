//! Event bridge service
//!
//! Turns bridge requests (public calendar name plus event record) into
//! calendar operations and maps the results back to event records.

use std::{fmt, sync::Arc};

use domain::{CalendarRoutes, EventId, EventRecord, TimeWindow};
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{CalendarError, CalendarEvent, CalendarPort},
};

/// Tunables for the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Prefix of generated event ids (`{prefix}-{start unix seconds}`)
    pub event_id_prefix: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            event_id_prefix: "jaresa".to_string(),
        }
    }
}

/// Service mapping bridge requests onto a calendar port
pub struct EventBridgeService {
    calendar_port: Arc<dyn CalendarPort>,
    routes: CalendarRoutes,
    settings: BridgeSettings,
}

impl fmt::Debug for EventBridgeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridgeService")
            .field("routes", &self.routes)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl EventBridgeService {
    /// Create a new bridge service with default settings
    pub fn new(calendar_port: Arc<dyn CalendarPort>, routes: CalendarRoutes) -> Self {
        Self::with_settings(calendar_port, routes, BridgeSettings::default())
    }

    /// Create a new bridge service with explicit settings
    pub fn with_settings(
        calendar_port: Arc<dyn CalendarPort>,
        routes: CalendarRoutes,
        settings: BridgeSettings,
    ) -> Self {
        Self {
            calendar_port,
            routes,
            settings,
        }
    }

    /// Routing table in use
    pub const fn routes(&self) -> &CalendarRoutes {
        &self.routes
    }

    /// Resolve a public calendar name to its collection
    pub fn resolve_calendar(&self, calendar: &str) -> Result<&str, ApplicationError> {
        Ok(self.routes.resolve(calendar)?)
    }

    /// Create an event from a caller record
    ///
    /// The caller's `id` is replaced by one derived from the start time.
    /// Returns the record as stored, with the generated id.
    #[instrument(skip(self, record), fields(title = %record.title))]
    pub async fn create_event(
        &self,
        calendar: &str,
        mut record: EventRecord,
    ) -> Result<EventRecord, ApplicationError> {
        let collection = self.resolve_calendar(calendar)?;
        record.validate_window()?;

        let id = EventId::for_start(&self.settings.event_id_prefix, record.start);
        info!(collection, event_id = %id, "Creating event");

        let mut event = CalendarEvent::new(id.as_str(), &record.title, record.start, record.end);
        if !record.telephone.is_empty() {
            event = event.with_description(&record.telephone);
        }

        self.calendar_port
            .put_event(collection, &event)
            .await
            .map_err(map_error)?;

        record.id = id.into();
        Ok(record)
    }

    /// Delete an event by id
    #[instrument(skip(self))]
    pub async fn delete_event(&self, calendar: &str, id: &str) -> Result<(), ApplicationError> {
        let collection = self.resolve_calendar(calendar)?;
        let id = EventId::parse(id)?;
        info!(collection, event_id = %id, "Deleting event");

        self.calendar_port
            .delete_event(collection, &id)
            .await
            .map_err(map_error)
    }

    /// List events of a calendar overlapping the window
    #[instrument(skip(self))]
    pub async fn list_events(
        &self,
        calendar: &str,
        window: TimeWindow,
    ) -> Result<Vec<EventRecord>, ApplicationError> {
        let collection = self.resolve_calendar(calendar)?;
        debug!(collection, start = %window.start(), end = %window.end(), "Querying events");

        let events = self
            .calendar_port
            .query_events(collection, &window)
            .await
            .map_err(map_error)?;

        Ok(events.into_iter().map(to_record).collect())
    }

    /// Check if the calendar server is reachable
    pub async fn is_available(&self) -> bool {
        self.calendar_port.is_available().await
    }
}

/// Map a stored calendar event to the caller record
///
/// DESCRIPTION fills both `tel` and `password`, which is what existing
/// front-ends read back.
fn to_record(event: CalendarEvent) -> EventRecord {
    let description = event.description.unwrap_or_default();
    EventRecord::new(event.summary, event.start, event.end)
        .with_id(event.uid)
        .with_telephone(description.clone())
        .with_password(description)
}

/// Map calendar error to application error
fn map_error(err: CalendarError) -> ApplicationError {
    match err {
        CalendarError::ServiceUnavailable(msg) => ApplicationError::ExternalService(msg),
        CalendarError::AuthenticationFailed => {
            ApplicationError::ExternalService("Calendar authentication failed".to_string())
        },
        CalendarError::CalendarNotFound(name) => {
            ApplicationError::Configuration(format!("Calendar collection not found: {name}"))
        },
        CalendarError::EventNotFound(id) => ApplicationError::NotFound(format!("Event {id}")),
        CalendarError::OperationFailed(msg) => ApplicationError::Internal(msg),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use domain::DomainError;

    use super::*;
    use crate::ports::MockCalendarPort;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, hour, 0, 0).unwrap()
    }

    fn service(port: MockCalendarPort) -> EventBridgeService {
        EventBridgeService::new(Arc::new(port), CalendarRoutes::default())
    }

    #[tokio::test]
    async fn create_event_generates_id_and_maps_fields() {
        let mut port = MockCalendarPort::new();
        port.expect_put_event()
            .withf(|collection, _| collection == "music_test")
            .times(1)
            .returning(|_, event| {
                assert_eq!(event.uid, "jaresa-1710007200");
                assert_eq!(event.summary, "Rehearsal");
                assert_eq!(event.description.as_deref(), Some("0612345678"));
                Ok(())
            });

        let record = EventRecord::new("Rehearsal", at(18), at(20))
            .with_id("client-chosen")
            .with_telephone("0612345678")
            .with_password("pw");

        let stored = service(port).create_event("music", record).await.unwrap();

        assert_eq!(stored.id, "jaresa-1710007200");
        assert_eq!(stored.title, "Rehearsal");
        assert_eq!(stored.telephone, "0612345678");
        assert_eq!(stored.password, "pw");
    }

    #[tokio::test]
    async fn create_event_omits_empty_description() {
        let mut port = MockCalendarPort::new();
        port.expect_put_event().times(1).returning(|_, event| {
            assert!(event.description.is_none());
            Ok(())
        });

        let record = EventRecord::new("Open slot", at(9), at(10));
        assert!(service(port).create_event("redbox", record).await.is_ok());
    }

    #[tokio::test]
    async fn create_event_uses_configured_prefix() {
        let mut port = MockCalendarPort::new();
        port.expect_put_event().times(1).returning(|_, _| Ok(()));

        let svc = EventBridgeService::with_settings(
            Arc::new(port),
            CalendarRoutes::default(),
            BridgeSettings {
                event_id_prefix: "studio".to_string(),
            },
        );
        let stored = svc
            .create_event("music", EventRecord::new("x", at(18), at(19)))
            .await
            .unwrap();
        assert_eq!(stored.id, "studio-1710007200");
    }

    #[tokio::test]
    async fn create_event_unknown_calendar() {
        let mut port = MockCalendarPort::new();
        port.expect_put_event().never();

        let result = service(port)
            .create_event("jazz", EventRecord::new("x", at(18), at(19)))
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::UnknownCalendar(_)))
        ));
    }

    #[tokio::test]
    async fn create_event_rejects_inverted_window() {
        let mut port = MockCalendarPort::new();
        port.expect_put_event().never();

        let result = service(port)
            .create_event("music", EventRecord::new("x", at(19), at(18)))
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::ValidationError(_)))
        ));
    }

    #[tokio::test]
    async fn create_event_server_down() {
        let mut port = MockCalendarPort::new();
        port.expect_put_event()
            .returning(|_, _| Err(CalendarError::ServiceUnavailable("refused".to_string())));

        let result = service(port)
            .create_event("music", EventRecord::new("x", at(18), at(19)))
            .await;

        assert!(matches!(result, Err(ApplicationError::ExternalService(_))));
    }

    #[tokio::test]
    async fn delete_event_resolves_collection() {
        let mut port = MockCalendarPort::new();
        port.expect_delete_event()
            .withf(|collection, id| collection == "live-perf_test" && id.as_str() == "jaresa-1")
            .times(1)
            .returning(|_, _| Ok(()));

        assert!(service(port).delete_event("live-perf", "jaresa-1").await.is_ok());
    }

    #[tokio::test]
    async fn delete_event_rejects_bad_id() {
        let mut port = MockCalendarPort::new();
        port.expect_delete_event().never();

        let result = service(port).delete_event("music", "../secret").await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::InvalidEventId(_)))
        ));
    }

    #[tokio::test]
    async fn delete_event_not_found() {
        let mut port = MockCalendarPort::new();
        port.expect_delete_event()
            .returning(|_, id| Err(CalendarError::EventNotFound(id.to_string())));

        let result = service(port).delete_event("music", "jaresa-9").await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_events_maps_records() {
        let mut port = MockCalendarPort::new();
        port.expect_query_events()
            .withf(|collection, window| {
                collection == "ja-events_test" && window.start().timestamp() == 1_710_007_200
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    CalendarEvent::new("a", "Gig", at(18), at(20)).with_description("0601"),
                    CalendarEvent::new("b", "Soundcheck", at(16), at(17)),
                ])
            });

        let window = TimeWindow::from_unix_seconds(1_710_007_999, 1_710_050_000).unwrap();
        let records = service(port).list_events("ja-events", window).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].title, "Gig");
        assert_eq!(records[0].telephone, "0601");
        assert_eq!(records[0].password, "0601");
        assert_eq!(records[1].telephone, "");
        assert_eq!(records[1].password, "");
    }

    #[tokio::test]
    async fn list_events_empty() {
        let mut port = MockCalendarPort::new();
        port.expect_query_events().returning(|_, _| Ok(Vec::new()));

        let window = TimeWindow::from_unix_seconds(0, 0).unwrap();
        let records = service(port).list_events("music", window).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn list_events_missing_collection_is_configuration_error() {
        let mut port = MockCalendarPort::new();
        port.expect_query_events()
            .returning(|c, _| Err(CalendarError::CalendarNotFound(c.to_string())));

        let window = TimeWindow::from_unix_seconds(0, 3600).unwrap();
        let result = service(port).list_events("music", window).await;
        assert!(matches!(result, Err(ApplicationError::Configuration(_))));
    }

    #[tokio::test]
    async fn is_available_delegates() {
        let mut port = MockCalendarPort::new();
        port.expect_is_available().times(1).returning(|| true);
        assert!(service(port).is_available().await);
    }

    #[test]
    fn auth_failure_maps_to_external_service() {
        assert!(matches!(
            map_error(CalendarError::AuthenticationFailed),
            ApplicationError::ExternalService(_)
        ));
    }

    #[test]
    fn debug_hides_port() {
        let svc = service(MockCalendarPort::new());
        let debug = format!("{svc:?}");
        assert!(debug.contains("EventBridgeService"));
        assert!(debug.contains("jaresa"));
    }
}
