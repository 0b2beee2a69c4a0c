//! Capability seam for turning texts into vectors

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// A remote or local service producing one vector per input text
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Vectors come back indexed by input position, not necessarily in order
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    fn provider_name(&self) -> &'static str;

    /// Model used when the configuration names none
    fn default_model(&self) -> &'static str;

    /// Vector length of `model`, when known without calling it
    fn dimensions(&self, model: &str) -> Option<usize>;
}
