//! Span data model.
//!
//! A `TraceSpan` is opened before a computation runs, filled in with its
//! outputs or error, and handed to an exporter exactly once.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Kind of computation a span wraps. Serialized as LangSmith's `run_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Chain,
    Llm,
}

/// Identity of an open span, inherited by spans opened beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    pub trace_id: Uuid,
    pub span_id: Uuid,
    pub dotted_order: String,
}

/// One traced computation.
#[derive(Debug, Clone, Serialize)]
pub struct TraceSpan {
    pub id: Uuid,
    pub trace_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub dotted_order: String,
    pub name: String,
    pub kind: SpanKind,
    pub tags: BTreeSet<String>,
    pub inputs: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl TraceSpan {
    /// Open a span, as a root when `parent` is `None`.
    pub fn open(
        name: &str,
        kind: SpanKind,
        tags: &[&str],
        inputs: serde_json::Value,
        parent: Option<&SpanContext>,
    ) -> Self {
        let id = Uuid::new_v4();
        let start_time = Utc::now();
        let segment = format!("{}{}", start_time.format("%Y%m%dT%H%M%S%6fZ"), id);

        let (trace_id, parent_id, dotted_order) = match parent {
            Some(p) => (p.trace_id, Some(p.span_id), format!("{}.{}", p.dotted_order, segment)),
            None => (id, None, segment),
        };

        Self {
            id,
            trace_id,
            parent_id,
            dotted_order,
            name: name.to_string(),
            kind,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            inputs,
            outputs: None,
            error: None,
            start_time,
            end_time: None,
        }
    }

    /// Context for spans nested under this one.
    pub fn context(&self) -> SpanContext {
        SpanContext {
            trace_id: self.trace_id,
            span_id: self.id,
            dotted_order: self.dotted_order.clone(),
        }
    }

    /// Close the span with the computation's return value.
    pub fn succeed(&mut self, outputs: serde_json::Value) {
        self.outputs = Some(outputs);
        self.end_time = Some(Utc::now());
    }

    /// Close the span with the computation's failure.
    pub fn fail(&mut self, error: String) {
        self.error = Some(error);
        self.end_time = Some(Utc::now());
    }

    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }
}
