//! Immutable vector index snapshot with exact search

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RetrievalResult, ScoredChunk, SimilarityMetric};
use crate::domain::chunking::Chunk;
use crate::domain::DomainError;

/// A chunk together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }

    pub fn chunk_id(&self) -> &str {
        &self.chunk.chunk_id
    }
}

/// Summary of a snapshot, cheap to clone and serialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub version: u64,
    pub dimension: usize,
    pub metric: SimilarityMetric,
    pub entries: usize,
    pub rows: usize,
    pub built_at: DateTime<Utc>,
}

/// Immutable, versioned collection of chunk vectors
///
/// Every stored vector has exactly `dimension` components. An empty snapshot
/// has dimension 0 and answers every query with an empty result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexSnapshot {
    version: u64,
    dimension: usize,
    metric: SimilarityMetric,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndexSnapshot {
    /// Build a snapshot from entries
    ///
    /// Fails with `DimensionMismatch` when any vector's length differs from
    /// the first one; no partial snapshot is ever returned.
    pub fn build(
        version: u64,
        mut entries: Vec<IndexEntry>,
        metric: SimilarityMetric,
    ) -> Result<Self, DomainError> {
        let dimension = entries.first().map(|e| e.vector.len()).unwrap_or(0);

        if !entries.is_empty() && dimension == 0 {
            return Err(DomainError::validation("index vectors must not be empty"));
        }

        let mut seen = HashSet::with_capacity(entries.len());

        for entry in &entries {
            if entry.vector.len() != dimension {
                return Err(DomainError::dimension_mismatch(dimension, entry.vector.len()));
            }

            if entry.vector.iter().any(|x| !x.is_finite()) {
                return Err(DomainError::validation(format!(
                    "vector for chunk '{}' contains non-finite values",
                    entry.chunk_id()
                )));
            }

            if entry.chunk.text.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "chunk '{}' has no text",
                    entry.chunk_id()
                )));
            }

            if !seen.insert(entry.chunk_id()) {
                return Err(DomainError::validation(format!(
                    "duplicate chunk id '{}'",
                    entry.chunk_id()
                )));
            }
        }

        entries.sort_by(|a, b| a.chunk_id().cmp(b.chunk_id()));

        Ok(Self {
            version,
            dimension,
            metric,
            built_at: Utc::now(),
            entries,
        })
    }

    /// Snapshot without entries
    pub fn empty(version: u64, metric: SimilarityMetric) -> Self {
        Self {
            version,
            dimension: 0,
            metric,
            built_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Re-check the invariants of a snapshot that did not come from `build`
    pub fn validate(&self) -> Result<(), DomainError> {
        let rebuilt = Self::build(self.version, self.entries.clone(), self.metric)?;

        if rebuilt.dimension != self.dimension && !self.entries.is_empty() {
            return Err(DomainError::dimension_mismatch(
                self.dimension,
                rebuilt.dimension,
            ));
        }

        Ok(())
    }

    /// Exact top-k search, best first, one hit per source row
    ///
    /// Only exactly equal scores are ordered by the lower chunk id.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<RetrievalResult, DomainError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(RetrievalResult::empty());
        }

        if vector.len() != self.dimension {
            return Err(DomainError::dimension_mismatch(self.dimension, vector.len()));
        }

        if vector.iter().any(|x| !x.is_finite()) {
            return Err(DomainError::validation(
                "query vector contains non-finite values",
            ));
        }

        let mut scored: Vec<(&IndexEntry, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry, self.metric.similarity(vector, &entry.vector)))
            .collect();

        scored.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| a.chunk_id().cmp(b.chunk_id()))
        });

        let mut rows = HashSet::new();
        let hits = scored
            .into_iter()
            .filter(|(entry, _)| rows.insert(entry.chunk.source_row_id.as_str()))
            .take(k)
            .map(|(entry, score)| ScoredChunk::new(entry.chunk.clone(), score))
            .collect();

        Ok(RetrievalResult::from_ordered(hits))
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn info(&self) -> SnapshotInfo {
        let rows: HashSet<&str> = self
            .entries
            .iter()
            .map(|e| e.chunk.source_row_id.as_str())
            .collect();

        SnapshotInfo {
            version: self.version,
            dimension: self.dimension,
            metric: self.metric,
            entries: self.entries.len(),
            rows: rows.len(),
            built_at: self.built_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(row: &str, offset: usize, vector: Vec<f32>) -> IndexEntry {
        IndexEntry::new(
            Chunk::new(row, format!("Title {}", row), format!("Text of {}", row), 0, offset),
            vector,
        )
    }

    #[test]
    fn test_build_rejects_mismatched_dimensions() {
        let entries = vec![
            entry("r1", 0, vec![1.0, 0.0, 0.0]),
            entry("r2", 0, vec![1.0, 0.0]),
        ];

        let err = VectorIndexSnapshot::build(1, entries, SimilarityMetric::Cosine).unwrap_err();

        assert!(matches!(
            err,
            DomainError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_build_records_dimension() {
        let snapshot = VectorIndexSnapshot::build(
            7,
            vec![entry("r1", 0, vec![1.0, 0.0]), entry("r2", 0, vec![0.0, 1.0])],
            SimilarityMetric::Cosine,
        )
        .unwrap();

        assert_eq!(snapshot.version(), 7);
        assert_eq!(snapshot.dimension(), 2);
        assert!(snapshot.entries().iter().all(|e| e.vector.len() == 2));
        assert_eq!(snapshot.info().rows, 2);
    }

    #[test]
    fn test_build_rejects_duplicate_chunk_ids() {
        let entries = vec![entry("r1", 0, vec![1.0]), entry("r1", 0, vec![0.5])];
        assert!(VectorIndexSnapshot::build(1, entries, SimilarityMetric::Cosine).is_err());
    }

    #[test]
    fn test_build_rejects_non_finite_vectors() {
        let entries = vec![entry("r1", 0, vec![f32::NAN, 1.0])];
        assert!(VectorIndexSnapshot::build(1, entries, SimilarityMetric::Cosine).is_err());
    }

    #[test]
    fn test_query_empty_snapshot_returns_empty() {
        let snapshot = VectorIndexSnapshot::empty(1, SimilarityMetric::Cosine);

        let result = snapshot.query(&[0.3, 0.1, 0.9], 5).unwrap();
        assert!(result.is_empty());

        let built = VectorIndexSnapshot::build(2, vec![], SimilarityMetric::L2).unwrap();
        assert!(built.query(&[1.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_query_orders_by_descending_similarity() {
        let snapshot = VectorIndexSnapshot::build(
            1,
            vec![
                entry("far", 0, vec![0.0, 1.0]),
                entry("exact", 0, vec![1.0, 0.2]),
                entry("near", 0, vec![0.9, 0.5]),
            ],
            SimilarityMetric::Cosine,
        )
        .unwrap();

        let result = snapshot.query(&[1.0, 0.2], 3).unwrap();
        let rows: Vec<&str> = result
            .hits()
            .iter()
            .map(|h| h.chunk.source_row_id.as_str())
            .collect();

        assert_eq!(rows, vec!["exact", "near", "far"]);
        assert!((result.hits()[0].score - 1.0).abs() < 1e-5);
        assert!(result.hits().windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_query_tie_prefers_lower_chunk_id() {
        let snapshot = VectorIndexSnapshot::build(
            1,
            vec![
                entry("rule-b", 0, vec![0.6, 0.8]),
                entry("rule-a", 0, vec![0.6, 0.8]),
            ],
            SimilarityMetric::Cosine,
        )
        .unwrap();

        let result = snapshot.query(&[0.6, 0.8], 1).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.hits()[0].chunk.chunk_id, "rule-a#000000");
    }

    #[test]
    fn test_identical_vector_outranks_near_duplicate_with_lower_id() {
        let snapshot = VectorIndexSnapshot::build(
            1,
            vec![
                entry("a", 0, vec![1.0, 0.0007]),
                entry("b", 0, vec![1.0, 0.0]),
            ],
            SimilarityMetric::Cosine,
        )
        .unwrap();

        let result = snapshot.query(&[1.0, 0.0], 2).unwrap();

        assert_eq!(result.hits()[0].chunk.source_row_id, "b");
        assert_eq!(result.hits()[1].chunk.source_row_id, "a");
        assert!(result.hits()[0].score > result.hits()[1].score);
    }

    #[test]
    fn test_query_deduplicates_by_source_row() {
        let snapshot = VectorIndexSnapshot::build(
            1,
            vec![
                entry("r1", 0, vec![1.0, 0.0]),
                entry("r1", 90, vec![0.9, 0.1]),
                entry("r2", 0, vec![0.5, 0.5]),
            ],
            SimilarityMetric::Cosine,
        )
        .unwrap();

        let result = snapshot.query(&[1.0, 0.0], 3).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.hits()[0].chunk.chunk_id, "r1#000000");
        assert_eq!(result.hits()[1].chunk.source_row_id, "r2");
    }

    #[test]
    fn test_query_respects_k() {
        let entries = (0..10)
            .map(|i| entry(&format!("r{}", i), 0, vec![1.0, i as f32]))
            .collect();
        let snapshot = VectorIndexSnapshot::build(1, entries, SimilarityMetric::L2).unwrap();

        assert_eq!(snapshot.query(&[1.0, 0.0], 4).unwrap().len(), 4);
        assert!(snapshot.query(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_query_scores_stay_in_metric_range() {
        let snapshot = VectorIndexSnapshot::build(
            1,
            vec![entry("r1", 0, vec![-1.0, 0.0]), entry("r2", 0, vec![1e20, 1e20])],
            SimilarityMetric::Cosine,
        )
        .unwrap();

        let result = snapshot.query(&[1.0, 0.0], 2).unwrap();
        assert!(result
            .hits()
            .iter()
            .all(|h| SimilarityMetric::Cosine.contains(h.score)));
    }

    #[test]
    fn test_query_with_wrong_dimension_fails() {
        let snapshot =
            VectorIndexSnapshot::build(1, vec![entry("r1", 0, vec![1.0, 0.0])], SimilarityMetric::Cosine)
                .unwrap();

        assert!(matches!(
            snapshot.query(&[1.0, 0.0, 0.0], 1),
            Err(DomainError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_detects_tampered_snapshot() {
        let snapshot =
            VectorIndexSnapshot::build(1, vec![entry("r1", 0, vec![1.0, 0.0])], SimilarityMetric::Cosine)
                .unwrap();
        let mut json = serde_json::to_value(&snapshot).unwrap();
        json["entries"][0]["vector"] = serde_json::json!([1.0, 0.0, 0.0]);

        let tampered: VectorIndexSnapshot = serde_json::from_value(json).unwrap();
        assert!(tampered.validate().is_err());
        assert!(snapshot.validate().is_ok());
    }
}
