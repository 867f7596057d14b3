//! Calendar bridge handlers
//!
//! `POST`, `GET` and `DELETE` on `/a/{calendar}`. The calendar segment is
//! resolved before the body or query is looked at, so an unknown calendar
//! is always a 404.

use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, State, rejection::QueryRejection},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use domain::{EventRecord, TimeWindow};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

/// Public calendar name taken from the path, known to be routable
#[derive(Debug, Clone)]
pub struct CalendarName(pub String);

impl FromRequestParts<AppState> for CalendarName {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(calendar) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::NotFound(e.body_text()))?;

        state.bridge.resolve_calendar(&calendar)?;
        Ok(Self(calendar))
    }
}

/// Event creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Ignored; the bridge assigns the id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    pub tel: String,
    #[serde(default)]
    pub password: String,
}

impl From<CreateEventRequest> for EventRecord {
    fn from(req: CreateEventRequest) -> Self {
        Self::new(req.title, req.start, req.end)
            .with_id(req.id)
            .with_telephone(req.tel)
            .with_password(req.password)
    }
}

/// Event deletion request; other record fields are ignored
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteEventRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub id: String,
}

/// Query bounds as Unix seconds
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Parse a query bound; a missing or empty value is 0
fn parse_bound(name: &str, value: Option<&str>) -> Result<i64, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(0),
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            ApiError::BadRequest(format!("{name} must be a Unix timestamp in seconds"))
        }),
    }
}

/// Create an event
#[instrument(skip(state, request))]
pub async fn create_event(
    State(state): State<AppState>,
    CalendarName(calendar): CalendarName,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> Result<Json<EventRecord>, ApiError> {
    let stored = state
        .bridge
        .create_event(&calendar, EventRecord::from(request))
        .await?;

    info!(event_id = %stored.id, "Event created");
    Ok(Json(stored))
}

/// Delete an event by id
#[instrument(skip(state, request))]
pub async fn delete_event(
    State(state): State<AppState>,
    CalendarName(calendar): CalendarName,
    ValidatedJson(request): ValidatedJson<DeleteEventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.bridge.delete_event(&calendar, &request.id).await?;

    info!(event_id = %request.id, "Event deleted");
    Ok(Json(serde_json::json!({})))
}

/// List events overlapping `[start, end)`, both truncated to the hour
#[instrument(skip(state, query))]
pub async fn list_events(
    State(state): State<AppState>,
    CalendarName(calendar): CalendarName,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let start = parse_bound("start", query.start.as_deref())?;
    let end = parse_bound("end", query.end.as_deref())?;
    let window = TimeWindow::from_unix_seconds(start, end)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let records = state.bridge.list_events(&calendar, window).await?;

    debug!(count = records.len(), "Events listed");
    Ok(Json(records))
}

/// Any other method on a calendar path, or a missing static file
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}
