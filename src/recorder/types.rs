//! Interaction types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::ConnectivityStatus;

/// A validated interaction. Every field present is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub question: String,
    pub response: String,
}

/// What gets handed to the trace backend for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Server-assigned; client timestamps are ignored.
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_text: Option<String>,
    pub success: bool,
}

/// Result of `InteractionRecorder::record`.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub record: InteractionRecord,
    pub connectivity: ConnectivityStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = InteractionRecord {
            user_id: Some("u1".to_string()),
            timestamp: Utc::now(),
            question: "What is AWP?".to_string(),
            response: "Average Wholesale Price".to_string(),
            generated_text: None,
            success: true,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["success"], true);
        assert!(value.get("generatedText").is_none());
        assert!(value["timestamp"].is_string());
    }
}
