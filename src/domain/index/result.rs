//! Retrieval result types

use serde::Serialize;

use crate::domain::chunking::Chunk;

/// A chunk paired with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

impl ScoredChunk {
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self { chunk, score }
    }
}

/// Ordered hits of a query, best first, at most one per source row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    /// Wrap hits that are already ordered and deduplicated
    pub(crate) fn from_ordered(hits: Vec<ScoredChunk>) -> Self {
        Self { hits }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> &[ScoredChunk] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn top_score(&self) -> Option<f32> {
        self.hits.first().map(|h| h.score)
    }

    pub fn chunk_ids(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.chunk.chunk_id.clone()).collect()
    }

    /// Drop every hit scoring below `threshold`
    pub fn retain_min_score(&mut self, threshold: f32) {
        self.hits.retain(|h| h.score >= threshold);
    }

    pub fn truncate(&mut self, k: usize) {
        self.hits.truncate(k);
    }

    pub fn into_hits(self) -> Vec<ScoredChunk> {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(row: &str, score: f32) -> ScoredChunk {
        ScoredChunk::new(Chunk::new(row, "title", "text", 0, 0), score)
    }

    #[test]
    fn test_retain_min_score_and_truncate() {
        let mut result =
            RetrievalResult::from_ordered(vec![hit("a", 0.9), hit("b", 0.5), hit("c", 0.2)]);

        result.retain_min_score(0.5);
        assert_eq!(result.len(), 2);

        result.truncate(1);
        assert_eq!(result.chunk_ids(), vec!["a#000000".to_string()]);
        assert_eq!(result.top_score(), Some(0.9));
    }

    #[test]
    fn test_empty_result() {
        let result = RetrievalResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.top_score(), None);
    }
}
