//! Index lifecycle: restore, rebuild and status

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::knowledge::KnowledgeSource;
use crate::domain::DomainError;
use crate::infrastructure::cache::AnswerCache;
use crate::infrastructure::index::{BuildReport, IndexBuilder, IndexStatus};

/// Index state as reported to operators
#[derive(Debug, Clone, Serialize)]
pub struct IndexOverview {
    #[serde(flatten)]
    pub status: IndexStatus,
    pub building: bool,
    pub source: String,
    pub last_build: Option<BuildReport>,
}

/// Rebuilds the index from the configured knowledge source
#[derive(Debug)]
pub struct IndexService {
    builder: Arc<IndexBuilder>,
    source: Arc<dyn KnowledgeSource>,
    cache: Option<AnswerCache>,
}

impl IndexService {
    pub fn new(builder: Arc<IndexBuilder>, source: Arc<dyn KnowledgeSource>) -> Self {
        Self {
            builder,
            source,
            cache: None,
        }
    }

    /// Drop cached answers whenever a new snapshot goes live
    pub fn with_cache(mut self, cache: AnswerCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn builder(&self) -> &Arc<IndexBuilder> {
        &self.builder
    }

    /// Serve the stored snapshot, or build one when the store is empty
    #[instrument(skip(self))]
    pub async fn ensure_ready(&self, build_if_missing: bool) -> Result<u64, DomainError> {
        if let Some(snapshot) = self.builder.restore_active().await? {
            return Ok(snapshot.version());
        }

        if !build_if_missing {
            info!("No stored snapshot, index stays empty until a rebuild");
            return Ok(self.builder.active().version());
        }

        info!(source = %self.source.describe(), "No stored snapshot, building from source");
        self.rebuild().await.map(|report| report.version)
    }

    /// Rebuild from the knowledge source and publish the result
    ///
    /// Fails with `Conflict` while another build is running.
    #[instrument(skip(self))]
    pub async fn rebuild(&self) -> Result<BuildReport, DomainError> {
        let report = self.builder.try_build_from_source(self.source.as_ref()).await?;

        if let Some(cache) = &self.cache {
            cache.clear().await;
        }

        Ok(report)
    }

    pub fn overview(&self) -> IndexOverview {
        IndexOverview {
            status: self.builder.active().status(),
            building: self.builder.is_building(),
            source: self.source.describe(),
            last_build: self.builder.last_report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::ChunkingConfig;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::index::{FailingSnapshotStore, SimilarityMetric, SnapshotStore};
    use crate::domain::knowledge::{KnowledgeRow, StaticKnowledgeSource};
    use crate::infrastructure::chunking::SentenceChunker;
    use crate::infrastructure::embedding::Embedder;
    use crate::infrastructure::index::{ActiveIndex, IndexBuilderConfig, InMemorySnapshotStore};
    use std::time::Duration;

    fn rows() -> Vec<KnowledgeRow> {
        vec![
            KnowledgeRow::new("leave", "Annual leave", "Employees get 14 days annual leave."),
            KnowledgeRow::new("remote", "Remote work", "Remote work needs manager approval."),
        ]
    }

    fn service(store: Arc<dyn SnapshotStore>, provider: MockEmbeddingProvider) -> IndexService {
        let builder = IndexBuilder::new(
            Arc::new(SentenceChunker::new(ChunkingConfig::default()).unwrap()),
            Embedder::new(Arc::new(provider), "mock-embedding"),
            store,
            Arc::new(ActiveIndex::new(SimilarityMetric::Cosine)),
            IndexBuilderConfig::default(),
        );

        IndexService::new(
            Arc::new(builder),
            Arc::new(StaticKnowledgeSource::new(rows())),
        )
    }

    #[tokio::test]
    async fn test_rebuild_reports_and_publishes() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let service = service(store.clone(), MockEmbeddingProvider::new("mock", 32));

        let report = service.rebuild().await.unwrap();

        assert_eq!(report.version, 1);
        assert_eq!(report.rows, 2);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.dimension, 32);

        let overview = service.overview();
        assert!(overview.status.loaded);
        assert!(!overview.building);
        assert_eq!(overview.last_build.unwrap().version, 1);
        assert_eq!(store.latest_version().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_ensure_ready_builds_when_store_is_empty() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let service = service(store.clone(), MockEmbeddingProvider::new("mock", 16));

        assert_eq!(service.ensure_ready(true).await.unwrap(), 1);
        // Second start restores instead of rebuilding
        assert_eq!(service.ensure_ready(true).await.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_ready_without_build_stays_empty() {
        let service = service(
            Arc::new(InMemorySnapshotStore::new()),
            MockEmbeddingProvider::new("mock", 16),
        );

        assert_eq!(service.ensure_ready(false).await.unwrap(), 0);
        assert!(!service.overview().status.loaded);
    }

    #[tokio::test]
    async fn test_rebuild_clears_answer_cache() {
        let cache = AnswerCache::default();
        let service = service(
            Arc::new(InMemorySnapshotStore::new()),
            MockEmbeddingProvider::new("mock", 16),
        )
        .with_cache(cache.clone());

        let answer = crate::domain::AnswerResponse::answered("14 days [leave]", vec![
            "leave#000000".to_string(),
        ]);
        cache.insert(0, "How many leave days?", &answer).await;
        assert!(cache.get(0, "How many leave days?").await.is_some());

        service.rebuild().await.unwrap();

        assert!(cache.get(0, "How many leave days?").await.is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_empty_index() {
        let service = service(
            Arc::new(FailingSnapshotStore),
            MockEmbeddingProvider::new("mock", 16),
        );

        let err = service.rebuild().await.unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(!service.overview().status.loaded);
    }

    #[tokio::test]
    async fn test_simultaneous_rebuilds_run_once() {
        let service = service(
            Arc::new(InMemorySnapshotStore::new()),
            MockEmbeddingProvider::new("mock", 16).with_delay(Duration::from_millis(20)),
        );

        let (first, second) = tokio::join!(service.rebuild(), service.rebuild());

        assert_eq!(first.unwrap().version, 1);
        assert!(matches!(second, Err(DomainError::Conflict { .. })));
        assert_eq!(service.overview().status.info.version, 1);
    }
}
