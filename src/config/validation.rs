//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ConfigIssue>>
//! - Missing credentials are not issues; the connectivity probe reports them

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, PolicyKind};

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid {field} URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("completion.model must not be empty when completion is enabled")]
    EmptyModel,

    #[error("completion.custom_prompt is required for the custom policy")]
    MissingCustomPrompt,
}

/// Validate a configuration, collecting every issue found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::ZeroRequestTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        issues.push(ConfigIssue::ZeroBodyLimit);
    }
    if config.langsmith.export_timeout_secs == 0 {
        issues.push(ConfigIssue::ZeroTimeout("langsmith.export_timeout_secs"));
    }
    if config.completion.request_timeout_secs == 0 {
        issues.push(ConfigIssue::ZeroTimeout("completion.request_timeout_secs"));
    }

    check_address(&mut issues, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut issues,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_url(&mut issues, "langsmith.endpoint", &config.langsmith.endpoint);
    check_url(&mut issues, "completion.api_url", &config.completion.api_url);

    if config.completion.enabled && config.completion.model.trim().is_empty() {
        issues.push(ConfigIssue::EmptyModel);
    }
    if config.completion.policy == PolicyKind::Custom
        && config
            .completion
            .custom_prompt
            .as_deref()
            .map_or(true, |p| p.trim().is_empty())
    {
        issues.push(ConfigIssue::MissingCustomPrompt);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_address(issues: &mut Vec<ConfigIssue>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(issues: &mut Vec<ConfigIssue>, field: &'static str, value: &str) {
    if url::Url::parse(value).is_err() {
        issues.push(ConfigIssue::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
