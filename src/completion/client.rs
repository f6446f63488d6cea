//! OpenAI-compatible chat completion client.
//!
//! # Responsibilities
//! - Send one `chat/completions` request per interaction
//! - Return the first choice's message text
//! - Classify transport, status and decode failures
//!
//! No retries and no streaming: a call either yields text or fails.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::completion::prompt::PromptPolicy;
use crate::completion::{CompletionError, CompletionInvoker};
use crate::config::CompletionConfig;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Completion client for any OpenAI-compatible endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
    policy: PromptPolicy,
}

impl OpenAiClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            policy: PromptPolicy::from_config(config),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, question: &str, response: &str) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingCredential)?;

        let user_turn = PromptPolicy::user_turn(question, response);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: self.policy.system_prompt() },
                ChatMessage { role: "user", content: &user_turn },
            ],
        };

        let res = self
            .http
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionInvoker for OpenAiClient {
    async fn complete(&self, question: &str, response: &str) -> Result<String, CompletionError> {
        let started = Instant::now();
        let result = self.send(question, response).await;
        metrics::record_completion(result.is_ok(), started);

        if let Err(e) = &result {
            tracing::error!(model = %self.model, error = %e, "Completion request failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = OpenAiClient::new(&CompletionConfig {
            api_url: "http://127.0.0.1:1/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.api_url, "http://127.0.0.1:1/v1");
        assert_eq!(client.model(), "gpt-4o-mini");

        let err = client.complete("q", "r").await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential));
    }

    #[test]
    fn test_request_serialization() {
        let req = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage { role: "system", content: "grade" },
                ChatMessage { role: "user", content: "Question: q\n\nResponse: r" },
            ],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Question: q\n\nResponse: r");
    }

    #[test]
    fn test_response_without_choices_decodes() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
