//! CalDAV client
//!
//! Connects to CalDAV servers for calendar operations.
//! Supports the subset of the protocol the bridge needs: OPTIONS for
//! server validation, PUT and DELETE on event resources, and REPORT
//! `calendar-query` with a time-range filter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::{Reader, events::Event};
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::event::{CalendarEvent, parse_vevents};

/// CalDAV client errors
#[derive(Debug, Error)]
pub enum CalDavError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for CalDavError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }
}

/// CalDAV server configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CalDavConfig {
    /// Server URL (e.g., <https://cal.example.com/dav.php/calendars/booking>)
    pub server_url: String,
    /// Username (basic auth is skipped when empty)
    #[serde(default)]
    pub username: String,
    /// Password (excluded from serialization to prevent leaks)
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Verify TLS certificates
    #[serde(default)]
    pub verify_certs: bool,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for CalDavConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("verify_certs", &self.verify_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

const fn default_timeout() -> u64 {
    30
}

/// CalDAV client trait for event operations
///
/// Collections are addressed relative to the configured server URL.
#[async_trait]
pub trait CalDavClient: Send + Sync {
    /// Check that the server speaks CalDAV (`DAV: calendar-access`)
    async fn validate_server(&self) -> Result<(), CalDavError>;

    /// Store an event at `/{collection}/{event.id}.ics`
    async fn put_event(&self, collection: &str, event: &CalendarEvent) -> Result<(), CalDavError>;

    /// Delete the event at `/{collection}/{event_id}.ics`
    async fn delete_event(&self, collection: &str, event_id: &str) -> Result<(), CalDavError>;

    /// Query events overlapping `[start, end)`
    async fn query_events(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalDavError>;
}

/// HTTP-based CalDAV client implementation
#[derive(Debug)]
pub struct HttpCalDavClient {
    client: Client,
    config: CalDavConfig,
    base_url: Url,
}

impl HttpCalDavClient {
    /// Create a new CalDAV client
    pub fn new(config: CalDavConfig) -> Result<Self, CalDavError> {
        let base_url = Url::parse(&config.server_url)
            .map_err(|e| CalDavError::InvalidUrl(format!("{}: {e}", config.server_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(CalDavError::InvalidUrl(config.server_url));
        }

        if !config.verify_certs {
            warn!(server_url = %config.server_url, "TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_certs)
            .build()
            .map_err(|e| CalDavError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Build a request with authentication when credentials are configured
    fn build_request(&self, method: &str, url: Url) -> reqwest::RequestBuilder {
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET);
        let request = self.client.request(method, url);

        if self.config.username.is_empty() {
            request
        } else {
            request.basic_auth(&self.config.username, Some(&self.config.password))
        }
    }

    /// Append path segments to the server URL, percent-encoding each one
    ///
    /// An empty last segment yields a trailing slash.
    pub(crate) fn url_with_segments<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Server root (always with a trailing slash)
    pub(crate) fn root_url(&self) -> Url {
        self.url_with_segments([""])
    }

    /// Build the collection URL (always with a trailing slash)
    pub(crate) fn collection_url(&self, collection: &str) -> Url {
        self.url_with_segments(
            collection
                .split('/')
                .filter(|s| !s.is_empty())
                .chain(std::iter::once("")),
        )
    }

    /// Build the URL of the event resource `{collection}/{event_id}.ics`
    ///
    /// The id is a single path segment: reserved characters are encoded.
    pub(crate) fn event_url(&self, collection: &str, event_id: &str) -> Url {
        let resource = format!("{event_id}.ics");
        self.url_with_segments(
            collection
                .split('/')
                .filter(|s| !s.is_empty())
                .chain(std::iter::once(resource.as_str())),
        )
    }

    /// Build a `calendar-query` REPORT body for VEVENTs within a time range
    pub(crate) fn time_range_query(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop>
    <D:getetag/>
    <C:calendar-data/>
  </D:prop>
  <C:filter>
    <C:comp-filter name="VCALENDAR">
      <C:comp-filter name="VEVENT">
        <C:time-range start="{}" end="{}"/>
      </C:comp-filter>
    </C:comp-filter>
  </C:filter>
</C:calendar-query>"#,
            start.format("%Y%m%dT%H%M%SZ"),
            end.format("%Y%m%dT%H%M%SZ")
        )
    }

    /// Extract iCalendar payloads from a multistatus response
    ///
    /// Matches `calendar-data` elements regardless of namespace prefix.
    pub(crate) fn extract_calendar_data_from_xml(xml_body: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml_body);
        reader.config_mut().trim_text(true);

        let mut ical_list = Vec::new();
        let mut buf = Vec::new();
        let mut inside_calendar_data = false;
        let mut current = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"calendar-data" {
                        inside_calendar_data = true;
                        current.clear();
                    }
                },
                Ok(Event::Text(e)) => {
                    if inside_calendar_data {
                        if let Ok(text) = e.unescape() {
                            current.push_str(&text);
                        }
                    }
                },
                Ok(Event::CData(e)) => {
                    if inside_calendar_data {
                        if let Ok(text) = std::str::from_utf8(e.as_ref()) {
                            current.push_str(text);
                        }
                    }
                },
                Ok(Event::End(e)) => {
                    if inside_calendar_data && e.local_name().as_ref() == b"calendar-data" {
                        inside_calendar_data = false;
                        if !current.trim().is_empty() {
                            ical_list.push(current.clone());
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    debug!(error = ?e, "XML parsing error in CalDAV response");
                    break;
                },
                _ => {},
            }
            buf.clear();
        }

        ical_list
    }
}

/// Whether a `DAV` response header advertises CalDAV support
pub(crate) fn advertises_calendar_access(dav_header: &str) -> bool {
    dav_header
        .split(',')
        .any(|token| token.trim().eq_ignore_ascii_case("calendar-access"))
}

#[async_trait]
impl CalDavClient for HttpCalDavClient {
    #[instrument(skip(self))]
    async fn validate_server(&self) -> Result<(), CalDavError> {
        let response = self.build_request("OPTIONS", self.root_url()).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(CalDavError::AuthenticationFailed),
            status if !status.is_success() => {
                return Err(CalDavError::RequestFailed(format!("HTTP {status}")));
            },
            _ => {},
        }

        let dav = response
            .headers()
            .get_all("DAV")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");

        if advertises_calendar_access(&dav) {
            debug!(dav = %dav, "CalDAV server validated");
            Ok(())
        } else {
            Err(CalDavError::RequestFailed(
                "server does not advertise calendar-access".to_string(),
            ))
        }
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn put_event(&self, collection: &str, event: &CalendarEvent) -> Result<(), CalDavError> {
        let url = self.event_url(collection, &event.id);

        let response = self
            .build_request("PUT", url)
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(event.to_ical())
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(CalDavError::AuthenticationFailed),
            // 409 Conflict: the parent collection does not exist
            StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
                Err(CalDavError::CalendarNotFound(collection.to_string()))
            },
            StatusCode::CREATED | StatusCode::NO_CONTENT | StatusCode::OK => {
                debug!(event_id = %event.id, "Event stored");
                Ok(())
            },
            status => Err(CalDavError::RequestFailed(format!("HTTP {status}"))),
        }
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, collection: &str, event_id: &str) -> Result<(), CalDavError> {
        let url = self.event_url(collection, event_id);

        let response = self.build_request("DELETE", url).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(CalDavError::AuthenticationFailed),
            StatusCode::NOT_FOUND => Err(CalDavError::EventNotFound(event_id.to_string())),
            StatusCode::NO_CONTENT | StatusCode::OK => {
                debug!(event_id, "Event deleted");
                Ok(())
            },
            status => Err(CalDavError::RequestFailed(format!("HTTP {status}"))),
        }
    }

    #[instrument(skip(self))]
    async fn query_events(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalDavError> {
        let url = self.collection_url(collection);

        let response = self
            .build_request("REPORT", url)
            .header("Content-Type", "application/xml; charset=utf-8")
            .header("Depth", "1")
            .body(Self::time_range_query(start, end))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(CalDavError::AuthenticationFailed),
            StatusCode::NOT_FOUND => {
                return Err(CalDavError::CalendarNotFound(collection.to_string()));
            },
            status if !status.is_success() => {
                return Err(CalDavError::RequestFailed(format!("HTTP {status}")));
            },
            _ => {},
        }

        let body = response
            .text()
            .await
            .map_err(|e| CalDavError::RequestFailed(e.to_string()))?;

        debug!(response_len = body.len(), "REPORT response received");

        let mut events = Vec::new();
        for ical_data in Self::extract_calendar_data_from_xml(&body) {
            match parse_vevents(&ical_data) {
                Ok(parsed) => events.extend(parsed),
                Err(e) => warn!(error = %e, "Skipping unparseable calendar-data"),
            }
        }

        Ok(events)
    }
}
