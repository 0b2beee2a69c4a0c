//! Vector index domain: immutable, versioned snapshots of chunk vectors

mod metric;
mod result;
mod snapshot;
mod store;

pub use metric::{cosine_similarity, l2_distance, SimilarityMetric};
pub use result::{RetrievalResult, ScoredChunk};
pub use snapshot::{IndexEntry, SnapshotInfo, VectorIndexSnapshot};
pub use store::SnapshotStore;

#[cfg(test)]
pub use store::mock::FailingSnapshotStore;
