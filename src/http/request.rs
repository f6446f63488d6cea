//! Request parsing and validation.
//!
//! # Responsibilities
//! - Read the raw body under the configured size limit
//! - Parse the JSON payload
//! - Enforce required fields before any external call
//!
//! # Design Decisions
//! - Bodies are parsed by hand rather than with the `Json` extractor so
//!   parse failures take the same JSON error path as every other failure
//! - Empty strings count as missing
//! - A client-supplied `timestamp` is accepted but never used

use axum::body::Body;
use serde::Deserialize;

use crate::config::ValidationConfig;
use crate::error::ValidationError;
use crate::recorder::InteractionRequest;

/// Incoming body of `POST /api/logging` and `POST /api/completion`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPayload {
    pub user_id: Option<String>,
    pub question: Option<String>,
    pub response: Option<String>,
    pub timestamp: Option<String>,
}

/// Read a request body, failing once it exceeds `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<axum::body::Bytes, String> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| format!("failed to read request body: {}", e))
}

pub fn parse_payload(bytes: &[u8]) -> Result<InteractionPayload, serde_json::Error> {
    serde_json::from_slice(bytes)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl InteractionPayload {
    /// Validate for the recording route.
    pub fn into_request(self, policy: &ValidationConfig) -> Result<InteractionRequest, ValidationError> {
        let user_id = non_empty(self.user_id);
        let question = non_empty(self.question);
        let response = non_empty(self.response);

        let mut missing = Vec::new();
        if policy.require_user_id && user_id.is_none() {
            missing.push("userId");
        }
        if question.is_none() {
            missing.push("question");
        }
        if response.is_none() {
            missing.push("response");
        }

        match (question, response) {
            (Some(question), Some(response)) if missing.is_empty() => Ok(InteractionRequest {
                user_id,
                question,
                response,
            }),
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }

    /// Validate for the completion route, which never needs a user.
    pub fn into_completion_input(self) -> Result<(String, String), ValidationError> {
        let policy = ValidationConfig { require_user_id: false };
        self.into_request(&policy).map(|r| (r.question, r.response))
    }
}
