//! Retrieval configuration

use serde::{Deserialize, Serialize};

use crate::domain::index::SimilarityMetric;
use crate::domain::DomainError;

/// Parameters of one retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of chunks returned
    pub top_k: usize,
    /// Hits scoring below this similarity are dropped
    pub min_similarity: f32,
    pub metric: SimilarityMetric,
}

impl RetrievalConfig {
    pub fn new(top_k: usize, min_similarity: f32, metric: SimilarityMetric) -> Self {
        Self {
            top_k,
            min_similarity,
            metric,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::validation("top_k must be greater than 0"));
        }

        if !self.metric.contains(self.min_similarity) {
            let (min, max) = self.metric.range();
            return Err(DomainError::validation(format!(
                "min_similarity {} is outside the {} range [{}, {}]",
                self.min_similarity, self.metric, min, max
            )));
        }

        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_similarity: 0.35,
            metric: SimilarityMetric::Cosine,
        }
    }
}
