//! Error types for the task service
//!
//! Provides unified error handling using thiserror. Only `TaskError` ever reaches
//! an HTTP caller; cache and broadcast failures are recovered where they occur.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

// == Field Errors ==
/// Validation messages grouped by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Converts into `Err` when any message was recorded.
    pub fn into_result(self) -> std::result::Result<(), TaskError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TaskError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

// == Task Error Enum ==
/// Errors surfaced to API callers.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Referenced task id does not exist
    #[error("Task not found: {0}")]
    NotFound(u64),

    /// Requested list page does not exist
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    /// Request data failed field validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Request body could not be decoded as JSON
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Request body was not sent as JSON
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            TaskError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": "Not found." })),
            TaskError::InvalidPage(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": "Invalid page." }))
            }
            TaskError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "fields": fields }),
            ),
            TaskError::MalformedBody(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            TaskError::UnsupportedMediaType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                json!({ "error": self.to_string() }),
            ),
            TaskError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for TaskError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                TaskError::UnsupportedMediaType(rejection.body_text())
            }
            _ => TaskError::MalformedBody(rejection.body_text()),
        }
    }
}

// == Cache Error Enum ==
/// Failures raised by a response cache backend.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key rejected by the backend
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Backend unreachable or misbehaving
    #[error("Cache backend error: {0}")]
    Backend(String),
}

// == Broadcast Error Enum ==
/// Failures raised when publishing to a topic.
#[derive(Error, Debug)]
pub enum BroadcastError {
    /// Nobody is currently joined to the topic
    #[error("No subscribers on topic '{topic}'")]
    NoSubscribers { topic: String },
}

// == Result Type Alias ==
/// Convenience Result type for the task service.
pub type Result<T> = std::result::Result<T, TaskError>;
