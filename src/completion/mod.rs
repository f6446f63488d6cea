//! Language-model completion subsystem.
//!
//! # Data Flow
//! ```text
//! (question, response)
//!     → prompt.rs (system instruction from policy + user turn)
//!     → client.rs (one POST to the completion service)
//!     → generated text, or CompletionError
//! ```

pub mod client;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::CompletionConfig;

pub use client::OpenAiClient;
pub use prompt::PromptPolicy;

/// Errors from the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service is not configured")]
    NotConfigured,

    #[error("completion service API key is not set")]
    MissingCredential,

    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion service returned no message")]
    EmptyResponse,

    #[error("invalid completion response: {0}")]
    Decode(String),
}

/// Produces generated text for one question/response pair.
#[async_trait]
pub trait CompletionInvoker: Send + Sync {
    async fn complete(&self, question: &str, response: &str) -> Result<String, CompletionError>;
}

/// Build the configured completion step, or `None` when disabled.
pub fn invoker_from_config(
    config: &CompletionConfig,
) -> Result<Option<Arc<dyn CompletionInvoker>>, CompletionError> {
    if !config.enabled {
        return Ok(None);
    }
    let client = OpenAiClient::new(config)?;
    tracing::info!(model = client.model(), policy = ?config.policy, "Completion step enabled");
    Ok(Some(Arc::new(client)))
}
