//! Chat completion capability domain models and traits

mod message;
mod provider;
mod request;
mod response;

pub use message::{Message, MessageRole};
pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder};
pub use response::{FinishReason, LlmResponse, TokenUsage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
