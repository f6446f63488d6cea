//! System prompt policies for the completion step.

use crate::config::{CompletionConfig, PolicyKind};

const ECHO_PROMPT: &str = "You are a relay. Reply with the learner's response exactly as written, \
with no additions, commentary or formatting changes.";

const RUBRIC_PROMPT: &str = "You are grading a teach-back exercise. The learner was asked a question \
and explained the answer in their own words. Judge the explanation for accuracy and completeness \
against the question. Reply with a grade of CORRECT, PARTIALLY CORRECT or INCORRECT on the first \
line, followed by one or two sentences naming anything missing or wrong.";

/// Instruction sent as the system turn of every completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPolicy {
    Echo,
    Rubric,
    Custom(String),
}

impl PromptPolicy {
    pub fn from_config(config: &CompletionConfig) -> Self {
        match config.policy {
            PolicyKind::Echo => PromptPolicy::Echo,
            PolicyKind::Rubric => PromptPolicy::Rubric,
            // validate_config rejects a custom policy without a prompt
            PolicyKind::Custom => PromptPolicy::Custom(config.custom_prompt.clone().unwrap_or_default()),
        }
    }

    pub fn system_prompt(&self) -> &str {
        match self {
            PromptPolicy::Echo => ECHO_PROMPT,
            PromptPolicy::Rubric => RUBRIC_PROMPT,
            PromptPolicy::Custom(prompt) => prompt.as_str(),
        }
    }

    /// Build the user turn from one interaction.
    pub fn user_turn(question: &str, response: &str) -> String {
        format!("Question: {}\n\nResponse: {}", question, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let mut config = CompletionConfig::default();
        assert_eq!(PromptPolicy::from_config(&config), PromptPolicy::Rubric);

        config.policy = PolicyKind::Custom;
        config.custom_prompt = Some("Summarize.".to_string());
        let policy = PromptPolicy::from_config(&config);
        assert_eq!(policy.system_prompt(), "Summarize.");
    }

    #[test]
    fn test_user_turn_layout() {
        let turn = PromptPolicy::user_turn("What is AWP?", "Average Wholesale Price");
        assert_eq!(turn, "Question: What is AWP?\n\nResponse: Average Wholesale Price");
    }
}
