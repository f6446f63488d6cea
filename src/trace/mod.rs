//! Interaction tracing subsystem.
//!
//! # Data Flow
//! ```text
//! TraceScope::run(name, tags, inputs, f)
//!     → span.rs (open span, inherit task-local parent)
//!     → f() runs with this span as parent
//!     → span closed with outputs or error
//!     → exporter.rs (LangSmith runs API, or local log)
//! ```
//!
//! # Design Decisions
//! - One span per `run` call, exported once, success or failure
//! - Parent/child linking via task-local context, not a global registry
//! - Application errors pass through untouched
//! - A span dropped before it closes is exported as cancelled

pub mod exporter;
pub mod scope;
pub mod span;

use std::sync::Arc;

use thiserror::Error;

use crate::config::LangSmithConfig;

pub use exporter::{LangSmithExporter, LogExporter, SpanExporter};
pub use scope::{current_span, TraceScope, CANCELLED};
pub use span::{SpanContext, SpanKind, TraceSpan};

/// Errors raised while exporting spans.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace backend API key is not set")]
    MissingCredential,

    #[error("trace backend request failed: {0}")]
    Transport(String),

    #[error("trace backend rejected span with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("span export task aborted: {0}")]
    Aborted(String),
}

/// Build the exporter selected by configuration.
pub fn exporter_from_config(config: &LangSmithConfig) -> Result<Arc<dyn SpanExporter>, TraceError> {
    if config.tracing_enabled {
        Ok(Arc::new(LangSmithExporter::new(config)?))
    } else {
        Ok(Arc::new(LogExporter))
    }
}
