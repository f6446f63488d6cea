//! Connectivity checks for external services.
//!
//! # Design Decisions
//! - Configuration presence only; no network round-trip
//! - Diagnostics must never block or fail the primary recording path
//! - Secret values are never reported, only presence and length

pub mod probe;

use thiserror::Error;

pub use probe::{ConnectivityProbe, ConnectivityStatus, Presence, SettingKey, SettingsSource};

/// Failure reading a setting. Always absorbed by the probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("setting {key} could not be read: {reason}")]
    Unreadable { key: &'static str, reason: String },
}
