//! Request deadline.
//!
//! The whole handler runs under one wall-clock budget. On expiry the handler
//! future is dropped, which cancels any in-flight completion call; open spans
//! are closed as cancelled by the trace scope. The client gets the same JSON
//! error envelope as every other failure.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::response::ApiError;

/// Upper bound on one request's wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline(pub Duration);

impl RequestDeadline {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }
}

pub async fn enforce_deadline(
    State(deadline): State<RequestDeadline>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match tokio::time::timeout(deadline.0, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::error!(
                path = %path,
                deadline_secs = deadline.0.as_secs(),
                "Request deadline exceeded"
            );
            ApiError::Timeout(deadline.0).into_response()
        }
    }
}
