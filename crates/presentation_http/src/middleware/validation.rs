//! Request validation
//!
//! Provides a `ValidatedJson` extractor that decodes the request body as JSON
//! and validates it using the validator crate.
//!
//! The body is decoded whatever its `Content-Type`, so clients posting plain
//! text bodies are accepted.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

use crate::error::ErrorResponse;

/// Validation error type
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Failed to read body: {0}")]
    Body(#[from] BytesRejection),
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Body(e) => e.status(),
            Self::JsonError(_) | Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        };

        let body = ErrorResponse::new(self.to_string(), "validation_error");

        (status, Json(body)).into_response()
    }
}

/// Join field errors into `"field: message; field: message"`
fn format_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors
                .iter()
                .map(|error| {
                    format!(
                        "{}: {}",
                        field,
                        error
                            .message
                            .as_ref()
                            .map_or_else(|| error.code.to_string(), ToString::to_string)
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// A JSON extractor that also validates the request body
///
/// # Example
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct DeleteEventRequest {
///     #[validate(length(min = 1))]
///     id: String,
/// }
///
/// async fn handler(ValidatedJson(req): ValidatedJson<DeleteEventRequest>) {
///     // req is validated
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        let value: T = serde_json::from_slice(&bytes)?;

        value
            .validate()
            .map_err(|e| ValidationError::ValidationFailed(format_errors(&e)))?;

        Ok(Self(value))
    }
}
