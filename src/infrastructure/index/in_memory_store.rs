//! In-memory snapshot store

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::index::{SnapshotStore, VectorIndexSnapshot};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    snapshots: BTreeMap<u64, VectorIndexSnapshot>,
    active: Option<u64>,
}

/// Snapshot store kept in process memory
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    state: RwLock<State>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.snapshots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: &VectorIndexSnapshot) -> Result<(), DomainError> {
        let mut state = self.state.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if state.snapshots.contains_key(&snapshot.version()) {
            return Err(DomainError::conflict(format!(
                "Snapshot {} already exists",
                snapshot.version()
            )));
        }

        state.snapshots.insert(snapshot.version(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, version: u64) -> Result<Option<VectorIndexSnapshot>, DomainError> {
        let state = self.state.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(state.snapshots.get(&version).cloned())
    }

    async fn load_active(&self) -> Result<Option<VectorIndexSnapshot>, DomainError> {
        let state = self.state.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(state
            .active
            .and_then(|version| state.snapshots.get(&version).cloned()))
    }

    async fn set_active(&self, version: u64) -> Result<(), DomainError> {
        let mut state = self.state.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if !state.snapshots.contains_key(&version) {
            return Err(DomainError::not_found(format!("Snapshot {} not found", version)));
        }

        state.active = Some(version);
        Ok(())
    }

    async fn latest_version(&self) -> Result<Option<u64>, DomainError> {
        let state = self.state.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(state.snapshots.keys().next_back().copied())
    }

    fn store_name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::index::SimilarityMetric;

    #[tokio::test]
    async fn test_save_and_activate() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load_active().await.unwrap().is_none());

        store
            .save(&VectorIndexSnapshot::empty(1, SimilarityMetric::Cosine))
            .await
            .unwrap();
        store
            .save(&VectorIndexSnapshot::empty(2, SimilarityMetric::Cosine))
            .await
            .unwrap();

        assert!(store.load_active().await.unwrap().is_none());
        assert_eq!(store.latest_version().await.unwrap(), Some(2));

        store.set_active(1).await.unwrap();
        assert_eq!(store.load_active().await.unwrap().unwrap().version(), 1);
    }

    #[tokio::test]
    async fn test_set_active_unknown_version() {
        let store = InMemorySnapshotStore::new();
        let err = store.set_active(9).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_snapshots_are_immutable() {
        let store = InMemorySnapshotStore::new();
        let snapshot = VectorIndexSnapshot::empty(1, SimilarityMetric::Cosine);

        store.save(&snapshot).await.unwrap();
        assert!(matches!(
            store.save(&snapshot).await,
            Err(DomainError::Conflict { .. })
        ));
        assert_eq!(store.len(), 1);
    }
}
