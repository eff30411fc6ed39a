use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::{error::CollectionError, log_error, log_warn};

const ENABLE_LOGS: bool = true;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again later.";

/// Body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: self.status.as_u16(),
            message: self.message,
            timestamp: Utc::now(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        let status = match &err {
            CollectionError::LogNotFound(_) => StatusCode::NOT_FOUND,
            CollectionError::ActiveLogExists { .. } | CollectionError::LogAlreadyCompleted(_) => {
                StatusCode::CONFLICT
            }
            CollectionError::InvalidTimeRange { .. }
            | CollectionError::InvalidDateRange { .. }
            | CollectionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CollectionError::Store(inner) => {
                log_error!("Unexpected failure while handling request: {inner:#}");
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR);
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                let field = json_field_name(&field);
                field_errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_deref()
                        .map(str::to_string)
                        .unwrap_or_else(|| error.code.to_string());
                    format!("{field}: {message}")
                })
            })
            .collect();
        details.sort();

        let message = format!("Validation failed: {}", details.join("; "));
        log_warn!("{message}");
        Self::bad_request(message)
    }
}

/// Request bodies are camelCase; validator reports the Rust field name.
fn json_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = !name.is_empty();
        } else if upper_next {
            name.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            name.push(ch);
        }
    }
    name
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        log_warn!("Rejected request body: {}", rejection.body_text());
        Self::bad_request(format!("Malformed request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query parameter: {}", rejection.body_text()))
    }
}
