//! Snapshot persistence trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::VectorIndexSnapshot;
use crate::domain::DomainError;

/// Durable storage for index snapshots
///
/// Snapshots are written once and never modified. The store also keeps a
/// pointer to the active version so a restart serves the same index.
#[async_trait]
pub trait SnapshotStore: Send + Sync + Debug {
    /// Persist a snapshot; must be durable before returning
    async fn save(&self, snapshot: &VectorIndexSnapshot) -> Result<(), DomainError>;

    /// Load a snapshot by version
    async fn load(&self, version: u64) -> Result<Option<VectorIndexSnapshot>, DomainError>;

    /// Load the snapshot the active pointer refers to, if any
    async fn load_active(&self) -> Result<Option<VectorIndexSnapshot>, DomainError>;

    /// Point the active pointer at a saved version
    async fn set_active(&self, version: u64) -> Result<(), DomainError>;

    /// Highest saved version
    async fn latest_version(&self) -> Result<Option<u64>, DomainError>;

    /// Get the store name
    fn store_name(&self) -> &'static str;
}
