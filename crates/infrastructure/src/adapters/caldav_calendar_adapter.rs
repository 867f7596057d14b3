//! Calendar adapter - Implements CalendarPort using integration_caldav

use std::sync::Arc;

use application::ports::{CalendarError, CalendarEvent, CalendarPort};
use async_trait::async_trait;
use domain::{EventId, TimeWindow};
use integration_caldav::{CalDavClient, CalDavError, CalendarEvent as CalDavEvent};
use tracing::{debug, instrument, warn};

/// Adapter for calendar operations using CalDAV
pub struct CalDavCalendarAdapter<C: CalDavClient> {
    client: Arc<C>,
}

impl<C: CalDavClient> std::fmt::Debug for CalDavCalendarAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavCalendarAdapter").finish_non_exhaustive()
    }
}

impl<C: CalDavClient> CalDavCalendarAdapter<C> {
    /// Create a new calendar adapter
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Map CalDAV error to calendar port error
    fn map_error(err: CalDavError) -> CalendarError {
        match err {
            CalDavError::ConnectionFailed(e) => CalendarError::ServiceUnavailable(e),
            CalDavError::Timeout => {
                CalendarError::ServiceUnavailable("CalDAV request timed out".into())
            },
            CalDavError::AuthenticationFailed => CalendarError::AuthenticationFailed,
            CalDavError::CalendarNotFound(e) => CalendarError::CalendarNotFound(e),
            CalDavError::EventNotFound(e) => CalendarError::EventNotFound(e),
            CalDavError::RequestFailed(e)
            | CalDavError::ParseError(e)
            | CalDavError::InvalidUrl(e) => {
                CalendarError::OperationFailed(e)
            },
        }
    }

    fn to_caldav(event: &CalendarEvent) -> CalDavEvent {
        let mut caldav = CalDavEvent::new(&event.uid, &event.summary, event.start, event.end);
        caldav.description.clone_from(&event.description);
        caldav
    }

    fn from_caldav(event: CalDavEvent) -> CalendarEvent {
        CalendarEvent {
            uid: event.id,
            summary: event.summary,
            description: event.description,
            start: event.start,
            end: event.end,
        }
    }
}

#[async_trait]
impl<C: CalDavClient + 'static> CalendarPort for CalDavCalendarAdapter<C> {
    #[instrument(skip(self, event), fields(uid = %event.uid))]
    async fn put_event(
        &self,
        collection: &str,
        event: &CalendarEvent,
    ) -> Result<(), CalendarError> {
        self.client
            .put_event(collection, &Self::to_caldav(event))
            .await
            .map_err(Self::map_error)?;

        debug!(collection, "Stored event");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, collection: &str, id: &EventId) -> Result<(), CalendarError> {
        self.client
            .delete_event(collection, id.as_str())
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn query_events(
        &self,
        collection: &str,
        window: &TimeWindow,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let events = self
            .client
            .query_events(collection, window.start(), window.end())
            .await
            .map_err(Self::map_error)?;

        debug!(count = events.len(), "Queried events");
        Ok(events.into_iter().map(Self::from_caldav).collect())
    }

    async fn is_available(&self) -> bool {
        match self.client.validate_server().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "CalDAV server unavailable");
                false
            },
        }
    }
}
