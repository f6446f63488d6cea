//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the interaction logger.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request deadline.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Required-field policy for incoming payloads.
    pub validation: ValidationConfig,

    /// Trace backend settings.
    pub langsmith: LangSmithConfig,

    /// Completion service settings.
    pub completion: CompletionConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum wall-clock time for one request, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 300 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Payload validation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject payloads without a non-empty `userId`.
    pub require_user_id: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_user_id: true,
        }
    }
}

/// Trace backend (LangSmith) configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LangSmithConfig {
    /// API base URL.
    pub endpoint: String,

    /// Project (session) spans are filed under.
    pub project: String,

    /// Ship spans to the backend. When false spans are only logged.
    pub tracing_enabled: bool,

    /// API key. Never logged.
    pub api_key: Option<String>,

    /// Upper bound on one span upload, connect to last byte, in seconds.
    pub export_timeout_secs: u64,
}

impl Default for LangSmithConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.smith.langchain.com".to_string(),
            project: "default".to_string(),
            tracing_enabled: false,
            api_key: None,
            export_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for LangSmithConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangSmithConfig")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("tracing_enabled", &self.tracing_enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("export_timeout_secs", &self.export_timeout_secs)
            .finish()
    }
}

/// System prompt policy for the completion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Repeat the learner's response back verbatim.
    Echo,
    /// Grade the response against the question.
    Rubric,
    /// Use `custom_prompt` as the system instruction.
    Custom,
}

/// Completion service configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Run the completion step while recording.
    pub enabled: bool,

    /// OpenAI-compatible API base URL.
    pub api_url: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Bearer credential. Never logged.
    pub api_key: Option<String>,

    /// Which system prompt to send.
    pub policy: PolicyKind,

    /// Prompt text for `PolicyKind::Custom`.
    pub custom_prompt: Option<String>,

    /// Connect timeout for the outbound call, in seconds.
    pub connect_timeout_secs: u64,

    /// Upper bound on the whole outbound call, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            policy: PolicyKind::Rubric,
            custom_prompt: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("enabled", &self.enabled)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("policy", &self.policy)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
