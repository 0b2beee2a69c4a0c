use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Chat completion capability used by the answer synthesizer
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// One non-streaming completion for `model`
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    fn provider_name(&self) -> &'static str;
}
