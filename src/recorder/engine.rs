//! Interaction recording.
//!
//! Runs the connectivity probe, stamps the interaction, optionally runs the
//! completion step, and returns the record from inside the
//! `storeInteraction` span so the span carries the whole record.

use std::sync::Arc;

use serde_json::json;

use crate::completion::{CompletionError, CompletionInvoker};
use crate::error::RecordingError;
use crate::health::ConnectivityProbe;
use crate::recorder::clock::{Clock, MonotonicClock, SystemClock};
use crate::recorder::types::{InteractionRecord, InteractionRequest, RecordOutcome};
use crate::trace::{SpanKind, TraceScope};

pub const STORE_SPAN: &str = "storeInteraction";
pub const COMPLETION_SPAN: &str = "completion";
pub const PROCESS_COMPLETION_SPAN: &str = "processCompletion";
pub const PRODUCTION_TAG: &str = "production";

/// Records one interaction per call. Shared across requests.
pub struct InteractionRecorder {
    probe: ConnectivityProbe,
    scope: TraceScope,
    completion: Option<Arc<dyn CompletionInvoker>>,
    clock: MonotonicClock,
}

impl InteractionRecorder {
    pub fn new(
        probe: ConnectivityProbe,
        scope: TraceScope,
        completion: Option<Arc<dyn CompletionInvoker>>,
    ) -> Self {
        Self {
            probe,
            scope,
            completion,
            clock: MonotonicClock::new(Arc::new(SystemClock)),
        }
    }

    /// Replace the wall-clock source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = MonotonicClock::new(clock);
        self
    }

    pub fn probe(&self) -> &ConnectivityProbe {
        &self.probe
    }

    /// Record one interaction under a `storeInteraction` span.
    pub async fn record(&self, request: &InteractionRequest) -> Result<RecordOutcome, RecordingError> {
        let connectivity = self.probe.check();

        let inputs = json!({
            "userId": request.user_id,
            "question": request.question,
            "response": request.response,
        });

        let result = self
            .scope
            .run(STORE_SPAN, &[PRODUCTION_TAG], inputs, || self.store(request))
            .await;

        match result {
            Ok(record) => Ok(RecordOutcome { record, connectivity }),
            Err(e) => {
                tracing::error!(
                    user_id = request.user_id.as_deref().unwrap_or("-"),
                    error = %e,
                    "Failed to store interaction"
                );
                Err(e)
            }
        }
    }

    /// Run only the completion step, under a `processCompletion` span.
    pub async fn process_completion(
        &self,
        question: &str,
        response: &str,
    ) -> Result<String, RecordingError> {
        let invoker = self
            .completion
            .as_ref()
            .ok_or(RecordingError::Completion(CompletionError::NotConfigured))?;

        let inputs = json!({ "question": question, "response": response });
        self.scope
            .run(PROCESS_COMPLETION_SPAN, &[PRODUCTION_TAG], inputs, || {
                self.complete(invoker.as_ref(), question, response)
            })
            .await
    }

    async fn store(&self, request: &InteractionRequest) -> Result<InteractionRecord, RecordingError> {
        let timestamp = self.clock.next();

        tracing::info!(
            user_id = request.user_id.as_deref().unwrap_or("-"),
            timestamp = %timestamp.to_rfc3339(),
            question_length = request.question.chars().count(),
            response_length = request.response.chars().count(),
            "Storing interaction"
        );

        let generated_text = match &self.completion {
            Some(invoker) => Some(
                self.complete(invoker.as_ref(), &request.question, &request.response)
                    .await?,
            ),
            None => None,
        };

        Ok(InteractionRecord {
            user_id: request.user_id.clone(),
            timestamp,
            question: request.question.clone(),
            response: request.response.clone(),
            generated_text,
            success: true,
        })
    }

    async fn complete(
        &self,
        invoker: &dyn CompletionInvoker,
        question: &str,
        response: &str,
    ) -> Result<String, RecordingError> {
        let inputs = json!({ "question": question, "response": response });
        self.scope
            .run_as(SpanKind::Llm, COMPLETION_SPAN, &[], inputs, || async {
                invoker
                    .complete(question, response)
                    .await
                    .map_err(RecordingError::from)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::trace::{SpanExporter, TraceError, TraceSpan};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<TraceSpan>>);

    #[async_trait]
    impl SpanExporter for Collect {
        async fn export(&self, span: &TraceSpan) -> Result<(), TraceError> {
            self.0.lock().unwrap().push(span.clone());
            Ok(())
        }
    }

    struct Grader {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CompletionInvoker for Grader {
        async fn complete(&self, _question: &str, response: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CompletionError::Status { status: 429, body: "rate limited".into() })
            } else {
                Ok(format!("CORRECT: {}", response))
            }
        }
    }

    fn request() -> InteractionRequest {
        InteractionRequest {
            user_id: Some("u1".to_string()),
            question: "What is AWP?".to_string(),
            response: "Average Wholesale Price".to_string(),
        }
    }

    fn build(grader: Option<Arc<Grader>>) -> (InteractionRecorder, Arc<Collect>) {
        let sink = Arc::new(Collect::default());
        let probe = ConnectivityProbe::new(Arc::new(AppConfig::default()));
        let completion = grader.map(|g| g as Arc<dyn CompletionInvoker>);
        (
            InteractionRecorder::new(probe, TraceScope::new(sink.clone()), completion),
            sink,
        )
    }

    #[tokio::test]
    async fn test_record_without_completion() {
        let (recorder, sink) = build(None);
        let outcome = recorder.record(&request()).await.unwrap();

        assert!(outcome.record.success);
        assert!(outcome.record.generated_text.is_none());
        assert!(!outcome.connectivity.connected);

        let spans = sink.0.lock().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, STORE_SPAN);
        assert!(spans[0].tags.contains(PRODUCTION_TAG));
        assert_eq!(spans[0].inputs["question"], "What is AWP?");
        assert_eq!(spans[0].outputs.as_ref().unwrap()["success"], true);
    }

    #[tokio::test]
    async fn test_record_with_completion_nests_span() {
        let grader = Arc::new(Grader { calls: AtomicUsize::new(0), fail: false });
        let (recorder, sink) = build(Some(grader.clone()));

        let outcome = recorder.record(&request()).await.unwrap();
        assert_eq!(
            outcome.record.generated_text.as_deref(),
            Some("CORRECT: Average Wholesale Price")
        );
        assert_eq!(grader.calls.load(Ordering::SeqCst), 1);

        let spans = sink.0.lock().unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].name, COMPLETION_SPAN);
        assert_eq!(spans[0].parent_id, Some(spans[1].id));
        assert_eq!(spans[0].trace_id, spans[1].trace_id);
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let grader = Arc::new(Grader { calls: AtomicUsize::new(0), fail: true });
        let (recorder, sink) = build(Some(grader));

        let err = recorder.record(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            RecordingError::Completion(CompletionError::Status { status: 429, .. })
        ));

        let spans = sink.0.lock().unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.error.is_some()));
        assert!(spans.iter().all(|s| s.outputs.is_none()));
    }

    #[tokio::test]
    async fn test_sequential_timestamps_non_decreasing() {
        let (recorder, _) = build(None);
        let first = recorder.record(&request()).await.unwrap();
        let second = recorder.record(&request()).await.unwrap();
        assert!(second.record.timestamp >= first.record.timestamp);
    }

    struct Scripted(Mutex<Vec<DateTime<Utc>>>);

    impl Clock for Scripted {
        fn now(&self) -> DateTime<Utc> {
            self.0.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn test_timestamp_holds_when_clock_steps_back() {
        let t0 = DateTime::from_timestamp_micros(1_700_000_000_000_000).unwrap();
        let clock = Scripted(Mutex::new(vec![t0, t0 - Duration::seconds(30), t0 + Duration::seconds(1)]));
        let (recorder, sink) = build(None);
        let recorder = recorder.with_clock(Arc::new(clock));

        let first = recorder.record(&request()).await.unwrap();
        let second = recorder.record(&request()).await.unwrap();
        let third = recorder.record(&request()).await.unwrap();
        assert_eq!(first.record.timestamp, t0);
        assert_eq!(second.record.timestamp, t0);
        assert_eq!(third.record.timestamp, t0 + Duration::seconds(1));

        let spans = sink.0.lock().unwrap();
        assert_eq!(
            spans[1].outputs.as_ref().unwrap()["timestamp"],
            serde_json::to_value(t0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_process_completion_requires_invoker() {
        let (recorder, sink) = build(None);
        let err = recorder.process_completion("q", "r").await.unwrap_err();
        assert!(matches!(err, RecordingError::Completion(CompletionError::NotConfigured)));
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
