//! Error taxonomy shared across subsystems.
//!
//! Subsystem errors live next to the code that raises them
//! (`CompletionError`, `TraceError`, `ProbeError`); this module holds the
//! request-level errors the HTTP layer maps to status codes.

use thiserror::Error;

pub use crate::completion::CompletionError;
pub use crate::health::ProbeError;
pub use crate::trace::TraceError;

/// A required payload field was missing or empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),
}

impl ValidationError {
    /// Names of the offending fields, for logs.
    pub fn fields(&self) -> &[&'static str] {
        match self {
            ValidationError::MissingFields(fields) => fields,
        }
    }
}

/// Failure while recording or tracing an interaction.
///
/// Display is transparent so the underlying message reaches the client
/// `details` unchanged.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Trace(#[from] TraceError),
}
