//! CalDAV event (VEVENT) support
//!
//! Encodes events as iCalendar documents and decodes the VEVENT components
//! found in `calendar-data` payloads.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike, parser,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CalDavError;

/// A calendar event (VEVENT component)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Unique event ID (UID)
    pub id: String,
    /// Event summary/title
    pub summary: String,
    /// Event description
    pub description: Option<String>,
    /// Start instant
    pub start: DateTime<Utc>,
    /// End instant
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// Create a new event with required fields
    pub fn new(
        id: impl Into<String>,
        summary: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            description: None,
            start,
            end,
        }
    }

    /// Builder: set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Encode as a standalone iCalendar document
    #[must_use]
    pub fn to_ical(&self) -> String {
        let mut vevent = icalendar::Event::new();
        vevent
            .uid(&self.id)
            .summary(&self.summary)
            .starts(self.start)
            .ends(self.end);
        if let Some(desc) = &self.description {
            vevent.description(desc);
        }

        let mut calendar = Calendar::new();
        calendar.push(vevent.done());
        calendar.done().to_string()
    }
}

/// Parse all VEVENT components of an iCalendar document
///
/// Events without a UID or a usable DTSTART are skipped.
pub fn parse_vevents(ical_data: &str) -> Result<Vec<CalendarEvent>, CalDavError> {
    let mut unfolded = parser::unfold(ical_data);
    // calendar-data extracted from XML may lose its final line break
    if !unfolded.ends_with('\n') {
        unfolded.push_str("\r\n");
    }
    let parsed = parser::read_calendar(&unfolded)
        .map_err(|e| CalDavError::ParseError(format!("iCalendar parse error: {e}")))?;

    let mut events = Vec::new();

    for component in parsed.components {
        let CalendarComponent::Event(vevent) = CalendarComponent::from(component) else {
            continue;
        };

        let id = vevent.get_uid().unwrap_or_default().to_string();
        let Some(start_value) = vevent.get_start() else {
            debug!(uid = %id, "Skipping VEVENT without DTSTART");
            continue;
        };
        let Some(start) = resolve_instant(&start_value) else {
            debug!(uid = %id, "Skipping VEVENT with unresolvable DTSTART");
            continue;
        };
        if id.is_empty() {
            continue;
        }

        let end = vevent
            .get_end()
            .as_ref()
            .and_then(resolve_instant)
            .unwrap_or_else(|| default_end(&start_value, start));

        events.push(CalendarEvent {
            id,
            summary: vevent.get_summary().unwrap_or_default().to_string(),
            description: vevent
                .get_description()
                .filter(|d| !d.is_empty())
                .map(ToString::to_string),
            start,
            end,
        });
    }

    Ok(events)
}

/// Resolve a DTSTART/DTEND value to a UTC instant
///
/// Floating times are read as UTC. Unknown TZIDs fall back to UTC.
fn resolve_instant(value: &DatePerhapsTime) -> Option<DateTime<Utc>> {
    match value {
        DatePerhapsTime::Date(date) => date_at_midnight(*date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(*dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            Some(Utc.from_utc_datetime(naive))
        },
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            Some(resolve_in_zone(date_time, tzid))
        },
    }
}

fn resolve_in_zone(local: &NaiveDateTime, tzid: &str) -> DateTime<Utc> {
    match tzid.parse::<Tz>() {
        Ok(tz) => tz
            .from_local_datetime(local)
            .earliest()
            .map_or_else(|| Utc.from_utc_datetime(local), |dt| dt.with_timezone(&Utc)),
        Err(_) => {
            debug!(tzid, "Unknown TZID, reading time as UTC");
            Utc.from_utc_datetime(local)
        },
    }
}

fn date_at_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// End of an event that carries no DTEND: one day for all-day events,
/// zero length otherwise
fn default_end(start_value: &DatePerhapsTime, start: DateTime<Utc>) -> DateTime<Utc> {
    match start_value {
        DatePerhapsTime::Date(_) => start + Duration::days(1),
        DatePerhapsTime::DateTime(_) => start,
    }
}
