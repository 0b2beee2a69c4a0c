//! Domain layer - Core entities, capability traits and pure algorithms

pub mod answer;
pub mod chunking;
pub mod embedding;
pub mod error;
pub mod index;
pub mod knowledge;
pub mod llm;
pub mod prompt;
pub mod retrieval;

pub use answer::{AnswerOutcome, AnswerRequest, AnswerResponse};
pub use chunking::{Chunk, ChunkingConfig, ChunkingStrategy};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::DomainError;
pub use index::{
    IndexEntry, RetrievalResult, ScoredChunk, SimilarityMetric, SnapshotInfo, SnapshotStore,
    VectorIndexSnapshot,
};
pub use knowledge::{KnowledgeRow, KnowledgeSource};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
pub use prompt::{AssembledPrompt, PromptAssembler, PromptConfig, PromptContext};
pub use retrieval::{Retrieval, RetrievalConfig};
