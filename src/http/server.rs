//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the collaborators (exporter, completion client, probe, recorder)
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, access log, deadline)
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::completion::{self, CompletionError};
use crate::config::{AppConfig, ValidationConfig};
use crate::health::ConnectivityProbe;
use crate::http::deadline::{enforce_deadline, RequestDeadline};
use crate::http::handlers::{health, log_interaction, preflight, process_completion};
use crate::recorder::InteractionRecorder;
use crate::trace::{self, TraceError, TraceScope};

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build trace exporter: {0}")]
    Trace(#[from] TraceError),

    #[error("failed to build completion client: {0}")]
    Completion(#[from] CompletionError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub recorder: Arc<InteractionRecorder>,
    pub validation: ValidationConfig,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(recorder: InteractionRecorder, config: &AppConfig) -> Self {
        Self {
            recorder: Arc::new(recorder),
            validation: config.validation.clone(),
            max_body_bytes: config.limits.max_body_bytes,
        }
    }

    /// Build production collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let exporter = trace::exporter_from_config(&config.langsmith)?;
        let completion = completion::invoker_from_config(&config.completion)?;
        let probe = ConnectivityProbe::new(Arc::new(config.clone()));

        let recorder = InteractionRecorder::new(probe, TraceScope::new(exporter), completion);
        Ok(Self::new(recorder, config))
    }
}

/// HTTP server for the interaction logger.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around prebuilt state.
    pub fn with_state(config: AppConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/logging", post(log_interaction).options(preflight))
            .route("/api/completion", post(process_completion).options(preflight))
            .route("/health", get(health))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                RequestDeadline::from_secs(config.timeouts.request_secs),
                enforce_deadline,
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
