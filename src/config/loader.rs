//! Configuration loading from disk and the process environment.

use std::path::Path;
use std::fs;
use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ConfigIssue};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ConfigIssue>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AppConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment settings onto a loaded configuration.
///
/// `lookup` is the environment accessor; `main` passes `std::env::var`, tests
/// pass a map. Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
    if let Some(v) = get("LANGSMITH_ENDPOINT") {
        config.langsmith.endpoint = v;
    }
    if let Some(v) = get("LANGSMITH_PROJECT") {
        config.langsmith.project = v;
    }
    if let Some(v) = get("LANGSMITH_TRACING") {
        config.langsmith.tracing_enabled = matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if let Some(v) = get("LANGCHAIN_API_KEY").or_else(|| get("LANGSMITH_API_KEY")) {
        config.langsmith.api_key = Some(v);
    }
    if let Some(v) = get("OPENAI_API_KEY") {
        config.completion.api_key = Some(v);
    }
    if let Some(v) = get("COMPLETION_MODEL") {
        config.completion.model = v;
    }
}
