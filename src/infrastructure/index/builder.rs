//! Index builder: chunk, embed, build, persist, publish

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::ActiveIndex;
use crate::domain::chunking::{Chunk, ChunkingStrategy};
use crate::domain::index::{IndexEntry, SimilarityMetric, SnapshotStore, VectorIndexSnapshot};
use crate::domain::knowledge::{validate_rows, KnowledgeRow, KnowledgeSource};
use crate::domain::DomainError;
use crate::infrastructure::embedding::Embedder;
use crate::infrastructure::observability::record_index_build;

/// Index builder settings
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBuilderConfig {
    /// Maximum number of texts per embedding call
    pub batch_size: usize,
    pub metric: SimilarityMetric,
}

impl Default for IndexBuilderConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            metric: SimilarityMetric::Cosine,
        }
    }
}

/// Summary of a successful build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub version: u64,
    pub rows: usize,
    pub chunks: usize,
    pub batches: usize,
    pub dimension: usize,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

/// Produces and publishes new index snapshots
///
/// Builds are exclusive and all-or-nothing: a failure at any step leaves
/// both the stored active pointer and the served snapshot untouched.
#[derive(Debug)]
pub struct IndexBuilder {
    chunker: Arc<dyn ChunkingStrategy>,
    embedder: Embedder,
    store: Arc<dyn SnapshotStore>,
    active: Arc<ActiveIndex>,
    config: IndexBuilderConfig,
    build_lock: tokio::sync::Mutex<()>,
    last_report: Mutex<Option<BuildReport>>,
}

impl IndexBuilder {
    pub fn new(
        chunker: Arc<dyn ChunkingStrategy>,
        embedder: Embedder,
        store: Arc<dyn SnapshotStore>,
        active: Arc<ActiveIndex>,
        config: IndexBuilderConfig,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
            active,
            config,
            build_lock: tokio::sync::Mutex::new(()),
            last_report: Mutex::new(None),
        }
    }

    pub fn active(&self) -> &Arc<ActiveIndex> {
        &self.active
    }

    /// Whether a build currently holds the build lock
    pub fn is_building(&self) -> bool {
        self.build_lock.try_lock().is_err()
    }

    pub fn last_report(&self) -> Option<BuildReport> {
        self.last_report.lock().ok().and_then(|r| r.clone())
    }

    /// Serve the stored active snapshot, if the store has one
    pub async fn restore_active(&self) -> Result<Option<Arc<VectorIndexSnapshot>>, DomainError> {
        let _guard = self.build_lock.lock().await;

        let Some(snapshot) = self.store.load_active().await? else {
            return Ok(None);
        };

        self.check_metric(&snapshot)?;
        self.check_embedder_dimension(&snapshot)?;

        let snapshot = Arc::new(snapshot);
        self.active.publish(snapshot.clone());

        info!(
            version = snapshot.version(),
            entries = snapshot.len(),
            store = self.store.store_name(),
            "Restored active index snapshot"
        );

        Ok(Some(snapshot))
    }

    /// Load rows from a source and build from them, waiting for any running build
    pub async fn build_from_source(
        &self,
        source: &dyn KnowledgeSource,
    ) -> Result<Arc<VectorIndexSnapshot>, DomainError> {
        let _guard = self.build_lock.lock().await;
        let rows = load_rows(source).await?;

        self.build_locked(&rows).await.map(|(snapshot, _)| snapshot)
    }

    /// Like `build_from_source`, but fails with `Conflict` instead of waiting
    /// when another build holds the lock
    pub async fn try_build_from_source(
        &self,
        source: &dyn KnowledgeSource,
    ) -> Result<BuildReport, DomainError> {
        let _guard = self
            .build_lock
            .try_lock()
            .map_err(|_| DomainError::conflict("An index build is already running"))?;
        let rows = load_rows(source).await?;

        self.build_locked(&rows).await.map(|(_, report)| report)
    }

    /// Build a snapshot from rows, persist it and make it active
    ///
    /// Concurrent calls run one after another; each gets its own version.
    pub async fn build_index(
        &self,
        rows: &[KnowledgeRow],
    ) -> Result<Arc<VectorIndexSnapshot>, DomainError> {
        let _guard = self.build_lock.lock().await;

        self.build_locked(rows).await.map(|(snapshot, _)| snapshot)
    }

    /// Caller holds `build_lock`
    async fn build_locked(
        &self,
        rows: &[KnowledgeRow],
    ) -> Result<(Arc<VectorIndexSnapshot>, BuildReport), DomainError> {
        let started = Instant::now();

        match self.run_build(rows, started).await {
            Ok(built) => {
                record_index_build(true, started.elapsed());
                Ok(built)
            }
            Err(e) => {
                record_index_build(false, started.elapsed());
                error!(
                    error = %e,
                    active_version = self.active.version(),
                    "Index build failed, keeping active snapshot"
                );
                Err(e)
            }
        }
    }

    async fn run_build(
        &self,
        rows: &[KnowledgeRow],
        started: Instant,
    ) -> Result<(Arc<VectorIndexSnapshot>, BuildReport), DomainError> {
        validate_rows(rows)?;

        let chunks: Vec<Chunk> = rows
            .iter()
            .flat_map(|row| self.chunker.chunk(row))
            .collect();

        let batch_size = self.config.batch_size.max(1);
        let mut entries = Vec::with_capacity(chunks.len());
        let mut batches = 0usize;

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            batches += 1;

            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, vector)| IndexEntry::new(chunk, vector)),
            );
        }

        let latest = self.store.latest_version().await?.unwrap_or(0);
        let version = latest.max(self.active.version()) + 1;

        let snapshot = VectorIndexSnapshot::build(version, entries, self.config.metric)?;
        self.check_embedder_dimension(&snapshot)?;

        self.store.save(&snapshot).await?;
        self.store.set_active(version).await?;

        let snapshot = Arc::new(snapshot);
        self.active.publish(snapshot.clone());

        let report = BuildReport {
            version,
            rows: rows.len(),
            chunks: chunks.len(),
            batches,
            dimension: snapshot.dimension(),
            duration_ms: started.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        };

        info!(
            version = report.version,
            rows = report.rows,
            chunks = report.chunks,
            batches = report.batches,
            dimension = report.dimension,
            duration_ms = report.duration_ms,
            chunker = self.chunker.name(),
            "Published index snapshot"
        );

        if let Ok(mut last) = self.last_report.lock() {
            *last = Some(report.clone());
        }

        Ok((snapshot, report))
    }

    /// Stored scores and `min_similarity` only agree under one metric
    fn check_metric(&self, snapshot: &VectorIndexSnapshot) -> Result<(), DomainError> {
        if snapshot.metric() == self.config.metric {
            return Ok(());
        }

        warn!(
            stored = %snapshot.metric(),
            configured = %self.config.metric,
            version = snapshot.version(),
            "Stored snapshot uses a different similarity metric"
        );
        Err(DomainError::configuration(format!(
            "snapshot {} was built with metric {} but retrieval.metric is {}; rebuild the index",
            snapshot.version(),
            snapshot.metric(),
            self.config.metric
        )))
    }

    fn check_embedder_dimension(&self, snapshot: &VectorIndexSnapshot) -> Result<(), DomainError> {
        if snapshot.is_empty() {
            return Ok(());
        }

        match self.embedder.expected_dimension() {
            Some(expected) if expected != snapshot.dimension() => {
                warn!(
                    expected = expected,
                    actual = snapshot.dimension(),
                    model = self.embedder.model(),
                    "Snapshot dimension does not match embedding model"
                );
                Err(DomainError::dimension_mismatch(expected, snapshot.dimension()))
            }
            _ => Ok(()),
        }
    }
}

async fn load_rows(source: &dyn KnowledgeSource) -> Result<Vec<KnowledgeRow>, DomainError> {
    let rows = source.load().await?;
    info!(source = %source.describe(), rows = rows.len(), "Loaded knowledge rows");

    Ok(rows)
}
