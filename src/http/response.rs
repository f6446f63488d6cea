//! Response envelopes and error-to-status mapping.
//!
//! This is the only place errors become HTTP status codes. Every failure
//! yields a JSON body with a stable `error` key.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const LOG_FAILURE: &str = "Failed to log interaction";
pub const COMPLETION_FAILURE: &str = "Failed to process completion";
pub const TIMEOUT_FAILURE: &str = "Request timed out";

/// Body of every 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langsmith_connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SuccessBody {
    pub fn ok() -> Self {
        Self {
            success: true,
            langsmith_connected: None,
            content: None,
        }
    }

    pub fn recorded(langsmith_connected: bool, content: Option<String>) -> Self {
        Self {
            langsmith_connected: Some(langsmith_connected),
            content,
            ..Self::ok()
        }
    }

    pub fn completed(content: String) -> Self {
        Self {
            content: Some(content),
            ..Self::ok()
        }
    }
}

impl IntoResponse for SuccessBody {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A failed request, as seen by the client.
#[derive(Debug)]
pub enum ApiError {
    /// Required field missing; nothing external was touched.
    Validation(ValidationError),
    /// Body unreadable, or recording failed.
    Logging(String),
    /// The completion-only route failed.
    Completion(String),
    /// The request deadline fired before the handler finished.
    Timeout(Duration),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Logging(_) | ApiError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            ApiError::Validation(_) => (MISSING_FIELDS, None),
            ApiError::Logging(details) => (LOG_FAILURE, Some(details.clone())),
            ApiError::Completion(details) => (COMPLETION_FAILURE, Some(details.clone())),
            ApiError::Timeout(limit) => (
                TIMEOUT_FAILURE,
                Some(format!("request exceeded the {}s deadline", limit.as_secs())),
            ),
        };
        ErrorBody {
            error: error.to_string(),
            details,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
