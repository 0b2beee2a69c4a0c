use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const DEFAULT_MAX_CHARS: usize = 800;
pub const DEFAULT_OVERLAP: usize = 100;

/// Size limits for splitting a row body, in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    /// Tail of one chunk repeated at the head of the next
    pub overlap: usize,
}

impl ChunkingConfig {
    pub fn new(max_chars: usize, overlap: usize) -> Self {
        Self { max_chars, overlap }
    }

    /// `overlap` must leave room for new text in every chunk
    pub fn validate(&self) -> Result<(), DomainError> {
        match (self.max_chars, self.overlap) {
            (0, _) => Err(DomainError::validation("chunking.max_chars must be positive")),
            (max, overlap) if overlap >= max => Err(DomainError::validation(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_chars ({})",
                overlap, max
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS, DEFAULT_OVERLAP)
    }
}
