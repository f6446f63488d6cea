//! Span exporters.
//!
//! # Responsibilities
//! - Ship closed spans to the trace backend (LangSmith runs API)
//! - Log spans locally when backend tracing is disabled

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::config::LangSmithConfig;
use crate::trace::span::TraceSpan;
use crate::trace::TraceError;

/// Destination for closed spans.
#[async_trait]
pub trait SpanExporter: Send + Sync {
    async fn export(&self, span: &TraceSpan) -> Result<(), TraceError>;
}

/// Posts each span to `{endpoint}/runs` as a finished LangSmith run.
pub struct LangSmithExporter {
    client: reqwest::Client,
    endpoint: String,
    project: String,
    api_key: Option<String>,
}

impl LangSmithExporter {
    pub fn new(config: &LangSmithConfig) -> Result<Self, TraceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.export_timeout_secs))
            .build()
            .map_err(|e| TraceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn run_body(&self, span: &TraceSpan) -> serde_json::Value {
        json!({
            "id": span.id,
            "trace_id": span.trace_id,
            "parent_run_id": span.parent_id,
            "dotted_order": span.dotted_order,
            "name": span.name,
            "run_type": span.kind,
            "tags": span.tags,
            "inputs": span.inputs,
            "outputs": span.outputs,
            "error": span.error,
            "start_time": span.start_time,
            "end_time": span.end_time,
            "session_name": self.project,
        })
    }
}

#[async_trait]
impl SpanExporter for LangSmithExporter {
    async fn export(&self, span: &TraceSpan) -> Result<(), TraceError> {
        let api_key = self.api_key.as_deref().ok_or(TraceError::MissingCredential)?;

        let res = self
            .client
            .post(format!("{}/runs", self.endpoint))
            .header("x-api-key", api_key)
            .json(&self.run_body(span))
            .send()
            .await
            .map_err(|e| TraceError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TraceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(span = %span.name, span_id = %span.id, trace_id = %span.trace_id, "Span exported");
        Ok(())
    }
}

/// Writes spans to the local log. Used when backend tracing is off.
#[derive(Debug, Default)]
pub struct LogExporter;

#[async_trait]
impl SpanExporter for LogExporter {
    async fn export(&self, span: &TraceSpan) -> Result<(), TraceError> {
        tracing::debug!(
            span = %span.name,
            span_id = %span.id,
            trace_id = %span.trace_id,
            failed = span.error.is_some(),
            "Span closed (backend tracing disabled)"
        );
        Ok(())
    }
}
