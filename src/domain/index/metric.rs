//! Similarity metrics

use std::fmt;

use serde::{Deserialize, Serialize};

/// Metric used to compare a query vector with indexed vectors
///
/// Both metrics are reported as a similarity where higher is better:
/// cosine similarity lies in `[-1, 1]`, L2 distance `d` is reported as
/// `1 / (1 + d)` which lies in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    #[default]
    Cosine,
    L2,
}

impl SimilarityMetric {
    /// Similarity of two vectors of equal length, always within `range()`
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        let (min, max) = self.range();

        let score = match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::L2 => 1.0 / (1.0 + l2_distance(a, b)),
        };

        if score.is_finite() {
            score.clamp(min, max)
        } else {
            min
        }
    }

    /// Inclusive bounds of the similarity values this metric produces
    pub fn range(&self) -> (f32, f32) {
        match self {
            Self::Cosine => (-1.0, 1.0),
            Self::L2 => (0.0, 1.0),
        }
    }

    pub fn contains(&self, score: f32) -> bool {
        let (min, max) = self.range();
        score >= min && score <= max
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::L2 => "l2",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Euclidean distance between two vectors
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
