//! Prompt and answer wording configuration

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Replaced by the configured fallback answer when the instruction is sent
pub const FALLBACK_PLACEHOLDER: &str = "{fallback}";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You answer employee questions about internal company rules. \
Use only the rule excerpts provided in the user message. \
If they do not contain the answer, reply exactly with: {fallback}";

pub const DEFAULT_FALLBACK_ANSWER: &str =
    "The knowledge base has no matching rule for this question.";

pub const DEFAULT_APOLOGY: &str = "Sorry, I could not answer right now. Please try again later.";

/// Prompt budget and fixed answer texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Maximum size of the context section in characters
    pub budget_chars: usize,
    pub system_instruction: String,
    /// Returned when nothing relevant was retrieved
    pub fallback_answer: String,
    /// Returned when the answer could not be produced
    pub apology: String,
}

impl PromptConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.budget_chars == 0 {
            return Err(DomainError::validation("budget_chars must be greater than 0"));
        }

        if self.fallback_answer.trim().is_empty() || self.apology.trim().is_empty() {
            return Err(DomainError::validation(
                "fallback_answer and apology must not be empty",
            ));
        }

        if !self.rendered_instruction().contains(self.fallback_answer.trim()) {
            return Err(DomainError::validation(format!(
                "system_instruction must contain {} or the fallback_answer text",
                FALLBACK_PLACEHOLDER
            )));
        }

        Ok(())
    }

    pub fn rendered_instruction(&self) -> String {
        render_instruction(&self.system_instruction, &self.fallback_answer)
    }
}

/// Fill the fallback placeholder of a system instruction
pub fn render_instruction(template: &str, fallback_answer: &str) -> String {
    template.replace(FALLBACK_PLACEHOLDER, fallback_answer.trim())
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            budget_chars: 6000,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
            apology: DEFAULT_APOLOGY.to_string(),
        }
    }
}
