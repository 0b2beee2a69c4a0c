//! Embedding capability implementations

mod embedder;
mod openai;

pub use embedder::{Embedder, DEFAULT_EMBEDDING_TIMEOUT};
pub use openai::OpenAiEmbeddingProvider;
