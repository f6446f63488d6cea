//! Route handlers.

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::health::Presence;
use crate::http::request::{parse_payload, read_body};
use crate::http::response::{ApiError, SuccessBody};
use crate::http::server::AppState;
use crate::observability::metrics::{self, InteractionOutcome};

/// `POST /api/logging`
pub async fn log_interaction(State(state): State<AppState>, body: Body) -> Response {
    let result = record_interaction(&state, body).await;

    match result {
        Ok(body) => {
            metrics::record_interaction(InteractionOutcome::Recorded);
            body.into_response()
        }
        Err(e) => {
            match &e {
                ApiError::Validation(v) => {
                    metrics::record_interaction(InteractionOutcome::Invalid);
                    tracing::warn!(missing = ?v.fields(), "Rejected interaction");
                }
                other => {
                    metrics::record_interaction(InteractionOutcome::Failed);
                    tracing::error!(error = ?other, "Error in logging route");
                }
            }
            e.into_response()
        }
    }
}

async fn record_interaction(state: &AppState, body: Body) -> Result<SuccessBody, ApiError> {
    tracing::info!(route = "/api/logging", "Interaction request received");

    let bytes = read_body(body, state.max_body_bytes)
        .await
        .map_err(ApiError::Logging)?;
    let payload = parse_payload(&bytes).map_err(|e| ApiError::Logging(e.to_string()))?;

    tracing::info!(
        has_user_id = payload.user_id.is_some(),
        question_length = payload.question.as_deref().map_or(0, |q| q.chars().count()),
        response_length = payload.response.as_deref().map_or(0, |r| r.chars().count()),
        "Logging interaction"
    );
    if let Some(ts) = &payload.timestamp {
        tracing::debug!(client_timestamp = %ts, "Ignoring client-supplied timestamp");
    }

    let request = payload.into_request(&state.validation)?;
    let outcome = state
        .recorder
        .record(&request)
        .await
        .map_err(|e| ApiError::Logging(e.to_string()))?;

    Ok(SuccessBody::recorded(
        outcome.connectivity.connected,
        outcome.record.generated_text,
    ))
}

/// `POST /api/completion`
pub async fn process_completion(State(state): State<AppState>, body: Body) -> Response {
    match run_completion(&state, body).await {
        Ok(body) => body.into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "Error in completion route");
            e.into_response()
        }
    }
}

async fn run_completion(state: &AppState, body: Body) -> Result<SuccessBody, ApiError> {
    tracing::info!(route = "/api/completion", "Completion request received");

    let bytes = read_body(body, state.max_body_bytes)
        .await
        .map_err(ApiError::Completion)?;
    let payload = parse_payload(&bytes).map_err(|e| ApiError::Completion(e.to_string()))?;
    let (question, response) = payload.into_completion_input()?;

    tracing::info!(
        question_length = question.chars().count(),
        response_length = response.chars().count(),
        "Processing completion"
    );

    let content = state
        .recorder
        .process_completion(&question, &response)
        .await
        .map_err(|e| ApiError::Completion(e.to_string()))?;

    Ok(SuccessBody::completed(content))
}

/// `OPTIONS` on any API route.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
        Json(SuccessBody::ok()),
    )
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub langsmith_connected: bool,
    pub diagnostics: BTreeMap<&'static str, Presence>,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let status = state.recorder.probe().check();
    Json(HealthReport {
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
        langsmith_connected: status.connected,
        diagnostics: status.diagnostics,
    })
}
