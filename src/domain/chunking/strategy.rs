//! Chunking strategy trait

use std::fmt::Debug;

use super::Chunk;
use crate::domain::knowledge::KnowledgeRow;

/// Lazy, finite sequence of chunks for one row
pub type ChunkStream<'a> = Box<dyn Iterator<Item = Chunk> + Send + 'a>;

/// Trait for chunking strategies
///
/// Implementations must be deterministic: the same row always yields the
/// same chunks in the same order, and calling `chunk` again restarts the
/// sequence from the beginning.
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split a row into chunks
    fn chunk<'a>(&self, row: &'a KnowledgeRow) -> ChunkStream<'a>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}
