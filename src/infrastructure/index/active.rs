//! Holder of the snapshot served to queries

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::domain::index::{SimilarityMetric, SnapshotInfo, VectorIndexSnapshot};

/// Status of the active index, as reported to operators
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    /// Whether any snapshot has been loaded or built yet
    pub loaded: bool,
    #[serde(flatten)]
    pub info: SnapshotInfo,
}

/// Single owner of the active snapshot
///
/// Readers pull an `Arc` at call time and keep using it for the whole
/// query, so a concurrent publish never changes a query midway. Before the
/// first publish an empty version 0 snapshot is served.
#[derive(Debug)]
pub struct ActiveIndex {
    current: ArcSwap<VectorIndexSnapshot>,
}

impl ActiveIndex {
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            current: ArcSwap::from_pointee(VectorIndexSnapshot::empty(0, metric)),
        }
    }

    /// The snapshot queries should use right now
    pub fn current(&self) -> Arc<VectorIndexSnapshot> {
        self.current.load_full()
    }

    /// Atomically replace the active snapshot, returning the previous one
    pub fn publish(&self, snapshot: Arc<VectorIndexSnapshot>) -> Arc<VectorIndexSnapshot> {
        metrics::gauge!("index_active_entries").set(snapshot.len() as f64);
        metrics::gauge!("index_active_version").set(snapshot.version() as f64);

        self.current.swap(snapshot)
    }

    pub fn version(&self) -> u64 {
        self.current.load().version()
    }

    pub fn is_loaded(&self) -> bool {
        self.version() > 0
    }

    pub fn status(&self) -> IndexStatus {
        let snapshot = self.current.load();

        IndexStatus {
            loaded: snapshot.version() > 0,
            info: snapshot.info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::Chunk;
    use crate::domain::index::IndexEntry;

    #[test]
    fn test_starts_empty_and_unloaded() {
        let active = ActiveIndex::new(SimilarityMetric::Cosine);

        assert!(!active.is_loaded());
        assert!(active.current().is_empty());
        assert_eq!(active.status().info.entries, 0);
    }

    #[test]
    fn test_publish_swaps_snapshot() {
        let active = ActiveIndex::new(SimilarityMetric::Cosine);
        let snapshot = VectorIndexSnapshot::build(
            3,
            vec![IndexEntry::new(Chunk::new("r1", "t", "text", 0, 0), vec![1.0, 0.0])],
            SimilarityMetric::Cosine,
        )
        .unwrap();

        let held = active.current();
        let previous = active.publish(Arc::new(snapshot));

        assert_eq!(previous.version(), 0);
        assert_eq!(held.version(), 0);
        assert_eq!(active.version(), 3);

        let status = active.status();
        assert!(status.loaded);
        assert_eq!(status.info.entries, 1);
        assert_eq!(status.info.dimension, 2);
    }
}
