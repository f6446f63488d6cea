//! Traced execution of async computations.
//!
//! `TraceScope::run` opens a span, runs the computation with that span as
//! the task-local parent, then closes and exports the span whatever the
//! outcome. The computation's own error is always returned unchanged.
//!
//! If the caller is dropped before the computation finishes (request
//! deadline, client disconnect), the span is still closed with
//! [`CANCELLED`] as its error and exported from a background task, so a
//! child span that already reached the backend never lacks its parent.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::observability::metrics;
use crate::trace::exporter::SpanExporter;
use crate::trace::span::{SpanContext, SpanKind, TraceSpan};
use crate::trace::TraceError;

tokio::task_local! {
    static CURRENT_SPAN: SpanContext;
}

/// Error attached to a span whose computation was dropped mid-flight.
pub const CANCELLED: &str = "cancelled before completion";

/// Handle for running computations under a span. Cheap to clone.
#[derive(Clone)]
pub struct TraceScope {
    exporter: Arc<dyn SpanExporter>,
}

impl TraceScope {
    pub fn new(exporter: Arc<dyn SpanExporter>) -> Self {
        Self { exporter }
    }

    /// Run `f` inside a `chain` span.
    pub async fn run<T, E, F, Fut>(
        &self,
        name: &str,
        tags: &[&str],
        inputs: serde_json::Value,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Display + From<TraceError>,
    {
        self.run_as(SpanKind::Chain, name, tags, inputs, f).await
    }

    /// Run `f` inside a span of the given kind.
    ///
    /// Exactly one span is exported per call. If `f` succeeds but the export
    /// fails, the export failure is returned. If both fail, `f`'s error wins.
    pub async fn run_as<T, E, F, Fut>(
        &self,
        kind: SpanKind,
        name: &str,
        tags: &[&str],
        inputs: serde_json::Value,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Display + From<TraceError>,
    {
        let parent = CURRENT_SPAN.try_with(|ctx| ctx.clone()).ok();
        let mut span = TraceSpan::open(name, kind, tags, inputs, parent.as_ref());
        let guard = CancelGuard::arm(span.clone(), Arc::clone(&self.exporter));

        let result = CURRENT_SPAN.scope(span.context(), f()).await;
        guard.disarm();

        match &result {
            Ok(value) => {
                let outputs = serde_json::to_value(value).unwrap_or_else(
                    |e| serde_json::json!({ "serialization_error": e.to_string() }),
                );
                span.succeed(outputs);
            }
            Err(e) => span.fail(e.to_string()),
        }

        let span_name = span.name.clone();
        let exported = self.emit(span).await;

        match (result, exported) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(export_err)) => {
                tracing::error!(span = %span_name, error = %export_err, "Span export failed");
                Err(E::from(export_err))
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(export_err)) => {
                tracing::warn!(
                    span = %span_name,
                    error = %export_err,
                    "Span export failed while reporting an earlier error"
                );
                Err(e)
            }
        }
    }

    /// Export on a detached task so a cancelled caller cannot cut the
    /// upload short; the caller still waits for it to finish.
    async fn emit(&self, span: TraceSpan) -> Result<(), TraceError> {
        let exporter = Arc::clone(&self.exporter);
        let handle = tokio::spawn(async move { exporter.export(&span).await });

        let result = match handle.await {
            Ok(r) => r,
            Err(e) => Err(TraceError::Aborted(e.to_string())),
        };
        metrics::record_span_export(result.is_ok());
        result
    }
}

/// Holds a copy of an open span while its computation runs. Dropped while
/// still armed, it closes the copy as cancelled and exports it.
struct CancelGuard {
    pending: Option<TraceSpan>,
    exporter: Arc<dyn SpanExporter>,
}

impl CancelGuard {
    fn arm(span: TraceSpan, exporter: Arc<dyn SpanExporter>) -> Self {
        Self {
            pending: Some(span),
            exporter,
        }
    }

    fn disarm(mut self) {
        self.pending = None;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        let Some(mut span) = self.pending.take() else {
            return;
        };
        span.fail(CANCELLED.to_string());
        tracing::warn!(span = %span.name, span_id = %span.id, "Span cancelled before completion");

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(span = %span.name, "No runtime left to export cancelled span");
            return;
        };
        let exporter = Arc::clone(&self.exporter);
        runtime.spawn(async move {
            let result = exporter.export(&span).await;
            metrics::record_span_export(result.is_ok());
            if let Err(e) = result {
                tracing::warn!(span = %span.name, error = %e, "Cancelled span export failed");
            }
        });
    }
}

/// Context of the innermost span running on this task, if any.
pub fn current_span() -> Option<SpanContext> {
    CURRENT_SPAN.try_with(|ctx| ctx.clone()).ok()
}
