use serde::{Deserialize, Serialize};

use super::{Message, MessageRole};

/// A chat completion call: the conversation plus sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn builder() -> LlmRequestBuilder {
        LlmRequestBuilder::default()
    }

    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rfind(|m| m.role == MessageRole::User)
            .map(Message::content_text)
    }
}

#[derive(Debug, Default)]
pub struct LlmRequestBuilder {
    request: Option<LlmRequest>,
}

impl LlmRequestBuilder {
    fn request(&mut self) -> &mut LlmRequest {
        self.request.get_or_insert_with(|| LlmRequest::new(Vec::new()))
    }

    pub fn message(mut self, message: Message) -> Self {
        self.request().messages.push(message);
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Message::system(content))
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request().temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request().max_tokens = Some(max_tokens);
        self
    }

    pub fn build(mut self) -> LlmRequest {
        self.request.take().unwrap_or_else(|| LlmRequest::new(Vec::new()))
    }
}
