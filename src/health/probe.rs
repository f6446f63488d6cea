//! Trace-backend connectivity probe.
//!
//! Reports which backend settings are present without ever exposing their
//! values. A probe failure degrades to `connected = false`; it never blocks
//! the request that asked for it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::config::AppConfig;
use crate::health::ProbeError;

/// Settings the probe inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SettingKey {
    Endpoint,
    Project,
    Tracing,
    ApiKey,
    CompletionApiKey,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::Endpoint,
        SettingKey::Project,
        SettingKey::Tracing,
        SettingKey::ApiKey,
        SettingKey::CompletionApiKey,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Endpoint => "endpoint",
            SettingKey::Project => "project",
            SettingKey::Tracing => "tracing",
            SettingKey::ApiKey => "apiKey",
            SettingKey::CompletionApiKey => "completionApiKey",
        }
    }

    /// Secret settings report their length; others only presence.
    pub fn is_secret(self) -> bool {
        matches!(self, SettingKey::ApiKey | SettingKey::CompletionApiKey)
    }
}

/// Read access to the settings the probe reports on.
pub trait SettingsSource: Send + Sync {
    fn lookup(&self, key: SettingKey) -> Result<Option<String>, ProbeError>;
}

impl SettingsSource for AppConfig {
    fn lookup(&self, key: SettingKey) -> Result<Option<String>, ProbeError> {
        let value = match key {
            SettingKey::Endpoint => Some(self.langsmith.endpoint.clone()),
            SettingKey::Project => Some(self.langsmith.project.clone()),
            SettingKey::Tracing => self.langsmith.tracing_enabled.then(|| "true".to_string()),
            SettingKey::ApiKey => self.langsmith.api_key.clone(),
            SettingKey::CompletionApiKey => self.completion.api_key.clone(),
        };
        Ok(value.filter(|v| !v.is_empty()))
    }
}

/// Presence of one setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Set,
    SetWithLength(usize),
    NotSet,
}

impl Presence {
    pub fn is_set(self) -> bool {
        !matches!(self, Presence::NotSet)
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Set => write!(f, "Set"),
            Presence::SetWithLength(len) => write!(f, "Set (length: {})", len),
            Presence::NotSet => write!(f, "Not set"),
        }
    }
}

impl Serialize for Presence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of one probe run.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityStatus {
    pub connected: bool,
    pub diagnostics: BTreeMap<&'static str, Presence>,
}

impl ConnectivityStatus {
    fn unavailable() -> Self {
        Self {
            connected: false,
            diagnostics: BTreeMap::new(),
        }
    }
}

/// Checks that the trace backend is configured.
#[derive(Clone)]
pub struct ConnectivityProbe {
    source: Arc<dyn SettingsSource>,
}

impl ConnectivityProbe {
    pub fn new(source: Arc<dyn SettingsSource>) -> Self {
        Self { source }
    }

    /// Run the probe. Never fails.
    ///
    /// `connected` is true when every setting could be read and both the
    /// backend endpoint and API key are present.
    pub fn check(&self) -> ConnectivityStatus {
        match self.inspect() {
            Ok(diagnostics) => {
                let present = |key: SettingKey| {
                    diagnostics
                        .get(key.name())
                        .map_or(false, |p| p.is_set())
                };
                let connected = present(SettingKey::Endpoint) && present(SettingKey::ApiKey);

                tracing::info!(
                    connected,
                    endpoint = %diagnostics[SettingKey::Endpoint.name()],
                    project = %diagnostics[SettingKey::Project.name()],
                    tracing = %diagnostics[SettingKey::Tracing.name()],
                    api_key = %diagnostics[SettingKey::ApiKey.name()],
                    "Trace backend settings"
                );
                ConnectivityStatus { connected, diagnostics }
            }
            Err(e) => {
                tracing::error!(error = %e, "Trace backend connectivity check failed");
                ConnectivityStatus::unavailable()
            }
        }
    }

    fn inspect(&self) -> Result<BTreeMap<&'static str, Presence>, ProbeError> {
        let mut diagnostics = BTreeMap::new();
        for key in SettingKey::ALL {
            let presence = match self.source.lookup(key)? {
                Some(value) if key.is_secret() => Presence::SetWithLength(value.len()),
                Some(_) => Presence::Set,
                None => Presence::NotSet,
            };
            diagnostics.insert(key.name(), presence);
        }
        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl SettingsSource for Broken {
        fn lookup(&self, key: SettingKey) -> Result<Option<String>, ProbeError> {
            Err(ProbeError::Unreadable {
                key: key.name(),
                reason: "store offline".to_string(),
            })
        }
    }

    #[test]
    fn test_all_absent_is_not_connected() {
        let mut config = AppConfig::default();
        config.langsmith.endpoint = String::new();
        config.langsmith.project = String::new();

        let status = ConnectivityProbe::new(Arc::new(config)).check();
        assert!(!status.connected);
        assert!(status.diagnostics.values().all(|p| *p == Presence::NotSet));
        assert_eq!(status.diagnostics.len(), SettingKey::ALL.len());
    }

    #[test]
    fn test_secret_reports_length_only() {
        let mut config = AppConfig::default();
        config.langsmith.api_key = Some("lsv2-secret".to_string());

        let status = ConnectivityProbe::new(Arc::new(config)).check();
        assert!(status.connected);
        assert_eq!(status.diagnostics["apiKey"], Presence::SetWithLength(11));
        assert_eq!(status.diagnostics["endpoint"], Presence::Set);
        assert_eq!(status.diagnostics["tracing"], Presence::NotSet);

        let rendered = serde_json::to_string(&status).unwrap();
        assert!(!rendered.contains("lsv2-secret"));
        assert!(rendered.contains("Set (length: 11)"));
    }

    #[test]
    fn test_source_failure_is_absorbed() {
        let status = ConnectivityProbe::new(Arc::new(Broken)).check();
        assert!(!status.connected);
        assert!(status.diagnostics.is_empty());
    }
}
