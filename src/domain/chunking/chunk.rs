//! Chunk entity

use serde::{Deserialize, Serialize};

/// Build the stable identifier of a chunk
///
/// The character offset is zero padded so that chunks of one row sort in
/// reading order.
pub fn chunk_id(row_id: &str, char_offset: usize) -> String {
    format!("{}#{:06}", row_id, char_offset)
}

/// A bounded span of a knowledge row used as the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub source_row_id: String,
    /// Title of the source row, kept for attribution
    pub title: String,
    pub text: String,
    /// Ordinal of the chunk within its row
    pub position: usize,
    /// Character offset of the chunk start within the row body
    pub char_offset: usize,
}

impl Chunk {
    /// Create a new chunk; the id is derived from row id and offset
    pub fn new(
        source_row_id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        position: usize,
        char_offset: usize,
    ) -> Self {
        let source_row_id = source_row_id.into();

        Self {
            chunk_id: chunk_id(&source_row_id, char_offset),
            source_row_id,
            title: title.into(),
            text: text.into(),
            position,
            char_offset,
        }
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
