//! Answer synthesizer over a chat completion provider

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::answer::AnswerResponse;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::prompt::{
    render_instruction, PromptContext, DEFAULT_FALLBACK_ANSWER, DEFAULT_SYSTEM_INSTRUCTION,
};
use crate::domain::DomainError;

/// Model settings and fixed texts used by the synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizerConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// May contain `{fallback}`, filled with `fallback_answer`
    pub system_instruction: String,
    pub fallback_answer: String,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 512,
            timeout: Duration::from_secs(20),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
        }
    }
}

/// Turns an assembled prompt into an answer
#[derive(Debug, Clone)]
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmProvider>,
    config: SynthesizerConfig,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmProvider>, config: SynthesizerConfig) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Answer from a prompt context
    ///
    /// Without relevant context the fixed fallback is returned and the model
    /// is not called. Any model failure, timeout or empty reply becomes
    /// `SynthesisUnavailable`.
    pub async fn synthesize(
        &self,
        context: &PromptContext,
        question: &str,
    ) -> Result<AnswerResponse, DomainError> {
        let prompt = match context {
            PromptContext::NoRelevantContext => {
                debug!("No relevant context, returning fallback answer");
                return Ok(AnswerResponse::fallback(self.config.fallback_answer.clone()));
            }
            PromptContext::Grounded(prompt) => prompt,
        };

        let request = LlmRequest::builder()
            .system(render_instruction(
                &self.config.system_instruction,
                &self.config.fallback_answer,
            ))
            .user(prompt.text.clone())
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build();

        let call = self.llm.chat(&self.config.model, request);
        let response = match tokio::time::timeout(self.config.timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(provider = self.llm.provider_name(), error = %e, "Chat completion failed");
                return Err(DomainError::synthesis_unavailable(e.to_string()));
            }
            Err(_) => {
                warn!(
                    provider = self.llm.provider_name(),
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Chat completion timed out"
                );
                return Err(DomainError::synthesis_unavailable(format!(
                    "timed out after {:?}",
                    self.config.timeout
                )));
            }
        };

        if response.is_truncated() {
            warn!(
                max_tokens = self.config.max_tokens,
                "Answer was cut off at the token limit"
            );
        }

        let text = response.content().trim();
        if text.is_empty() {
            return Err(DomainError::synthesis_unavailable("model returned an empty answer"));
        }

        debug!(
            question_chars = question.chars().count(),
            prompt_chars = prompt.text.chars().count(),
            sources = prompt.used_chunk_ids.len(),
            answer_chars = text.chars().count(),
            "Synthesized answer"
        );

        // The model declined using the instructed wording
        if text == self.config.fallback_answer.trim() {
            return Ok(AnswerResponse::fallback(text));
        }

        Ok(AnswerResponse::answered(text, prompt.used_chunk_ids.clone()))
    }
}
