//! Integration tests for CalDAV client using WireMock
//!
//! These tests mock CalDAV server responses (OPTIONS, REPORT, PUT, DELETE)
//! to verify client behavior without requiring an actual CalDAV server.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, TimeZone, Utc};
use integration_caldav::{
    CalDavClient, CalDavConfig, CalDavError, CalendarEvent, HttpCalDavClient,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, header_exists, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config(base_url: &str) -> CalDavConfig {
    CalDavConfig {
        server_url: format!("{base_url}/calendars/resa"),
        username: "test_user".to_string(),
        password: "test_pass".to_string(),
        verify_certs: true,
        timeout_secs: 5,
    }
}

fn client(server: &MockServer) -> HttpCalDavClient {
    HttpCalDavClient::new(test_config(&server.uri())).unwrap()
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, hour, 0, 0).unwrap()
}

fn test_event() -> CalendarEvent {
    CalendarEvent::new("jaresa-1710007200", "Rehearsal", at(18), at(20))
        .with_description("0612345678")
}

/// Sample REPORT response with two events, one of them in a foreign zone
fn report_events_response() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/resa/music_test/jaresa-1710007200.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"etag-1"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Test//Test//EN
BEGIN:VEVENT
UID:jaresa-1710007200
SUMMARY:Rehearsal
DESCRIPTION:0612345678
DTSTART:20240309T180000Z
DTEND:20240309T200000Z
END:VEVENT
END:VCALENDAR
</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/resa/music_test/imported.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"etag-2"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Test//Test//EN
BEGIN:VEVENT
UID:imported
SUMMARY:Concert
DTSTART;TZID=Europe/Paris:20240309T220000
DTEND;TZID=Europe/Paris:20240309T233000
END:VEVENT
END:VCALENDAR
</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#
}

fn empty_multistatus() -> &'static str {
    r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
</D:multistatus>"#
}

// =============================================================================
// Server validation (OPTIONS)
// =============================================================================

#[tokio::test]
async fn validate_server_accepts_calendar_access() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .and(path("/calendars/resa/"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("DAV", "1, 2, 3, calendar-access"),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).validate_server().await.is_ok());
}

#[tokio::test]
async fn validate_server_rejects_plain_webdav() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .respond_with(ResponseTemplate::new(200).insert_header("DAV", "1, 2"))
        .mount(&server)
        .await;

    let result = client(&server).validate_server().await;
    assert!(matches!(result, Err(CalDavError::RequestFailed(_))));
}

#[tokio::test]
async fn validate_server_reports_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).validate_server().await;
    assert!(matches!(result, Err(CalDavError::AuthenticationFailed)));
}

#[tokio::test]
async fn unreachable_server_is_connection_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let caldav = HttpCalDavClient::new(test_config(&uri)).unwrap();
    let result = caldav.validate_server().await;
    assert!(matches!(result, Err(CalDavError::ConnectionFailed(_))));
}

// =============================================================================
// PUT
// =============================================================================

#[tokio::test]
async fn put_event_sends_icalendar_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/calendars/resa/music_test/jaresa-1710007200.ics"))
        .and(header("Content-Type", "text/calendar; charset=utf-8"))
        .and(header_exists("Authorization"))
        .and(body_string_contains("UID:jaresa-1710007200"))
        .and(body_string_contains("SUMMARY:Rehearsal"))
        .and(body_string_contains("DESCRIPTION:0612345678"))
        .and(body_string_contains("DTSTART:20240309T180000Z"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).put_event("music_test", &test_event()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn put_event_overwrite_returns_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(
        client(&server)
            .put_event("music_test", &test_event())
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn put_event_without_credentials_skips_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.username = String::new();
    let caldav = HttpCalDavClient::new(config).unwrap();

    assert!(caldav.put_event("music_test", &test_event()).await.is_ok());
}

#[tokio::test]
async fn put_event_missing_collection() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let result = client(&server).put_event("nowhere", &test_event()).await;
    assert!(matches!(result, Err(CalDavError::CalendarNotFound(c)) if c == "nowhere"));
}

#[tokio::test]
async fn put_event_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).put_event("music_test", &test_event()).await;
    assert!(matches!(result, Err(CalDavError::AuthenticationFailed)));
}

#[tokio::test]
async fn put_event_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client(&server).put_event("music_test", &test_event()).await;
    assert!(matches!(result, Err(CalDavError::RequestFailed(_))));
}

// =============================================================================
// DELETE
// =============================================================================

#[tokio::test]
async fn delete_event_targets_resource() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/resa/live-perf_test/jaresa-1.ics"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(
        client(&server)
            .delete_event("live-perf_test", "jaresa-1")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn delete_event_keeps_reserved_characters_inside_resource_name() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(&server);
    for id in ["keep#", "keep?x", "gig.ics"] {
        client.delete_event("music_test", id).await.unwrap();
    }

    let requests = server.received_requests().await.unwrap();
    let targets: Vec<(String, Option<String>)> = requests
        .iter()
        .map(|r| (r.url.path().to_string(), r.url.query().map(str::to_string)))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("/calendars/resa/music_test/keep%23.ics".to_string(), None),
            ("/calendars/resa/music_test/keep%3Fx.ics".to_string(), None),
            ("/calendars/resa/music_test/gig.ics.ics".to_string(), None),
        ]
    );
}

#[tokio::test]
async fn delete_event_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client(&server).delete_event("music_test", "gone").await;
    assert!(matches!(result, Err(CalDavError::EventNotFound(id)) if id == "gone"));
}

// =============================================================================
// REPORT
// =============================================================================

#[tokio::test]
async fn query_events_sends_time_range_report() {
    let server = MockServer::start().await;
    Mock::given(method("REPORT"))
        .and(path("/calendars/resa/music_test/"))
        .and(header("Depth", "1"))
        .and(body_string_contains("calendar-query"))
        .and(body_string_contains(r#"start="20240309T180000Z""#))
        .and(body_string_contains(r#"end="20240310T000000Z""#))
        .respond_with(ResponseTemplate::new(207).set_body_string(report_events_response()))
        .expect(1)
        .mount(&server)
        .await;

    let events = client(&server)
        .query_events("music_test", at(18), at(0) + chrono::Duration::days(1))
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], test_event());
    assert_eq!(events[1].id, "imported");
    assert_eq!(events[1].summary, "Concert");
    assert_eq!(events[1].start, at(21));
    assert_eq!(events[1].end, at(22) + chrono::Duration::minutes(30));
}

#[tokio::test]
async fn query_events_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("REPORT"))
        .respond_with(ResponseTemplate::new(207).set_body_string(empty_multistatus()))
        .mount(&server)
        .await;

    let events = client(&server)
        .query_events("music_test", at(0), at(1))
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn query_events_missing_collection() {
    let server = MockServer::start().await;
    Mock::given(method("REPORT"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client(&server).query_events("nowhere", at(0), at(1)).await;
    assert!(matches!(result, Err(CalDavError::CalendarNotFound(_))));
}

#[tokio::test]
async fn query_events_forbidden_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("REPORT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client(&server).query_events("music_test", at(0), at(1)).await;
    assert!(matches!(result, Err(CalDavError::RequestFailed(_))));
}
