//! Metrics collection and exposition.
//!
//! # Metrics
//! - `interactions_total` (counter): interactions by outcome (recorded, invalid, failed)
//! - `completions_total` (counter): completion calls by outcome (ok, error)
//! - `completion_duration_seconds` (histogram): completion latency
//! - `trace_spans_exported_total` (counter): span exports by outcome (ok, error)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome label for `interactions_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    Recorded,
    Invalid,
    Failed,
}

impl InteractionOutcome {
    fn as_str(self) -> &'static str {
        match self {
            InteractionOutcome::Recorded => "recorded",
            InteractionOutcome::Invalid => "invalid",
            InteractionOutcome::Failed => "failed",
        }
    }
}

/// Initialize the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_interaction(outcome: InteractionOutcome) {
    counter!("interactions_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_completion(ok: bool, started: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("completions_total", "outcome" => outcome).increment(1);
    histogram!("completion_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_span_export(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("trace_spans_exported_total", "outcome" => outcome).increment(1);
}
