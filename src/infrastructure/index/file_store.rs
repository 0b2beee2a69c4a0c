//! File-backed snapshot store
//!
//! Layout of the snapshot directory:
//!
//! ```text
//! snapshot-00000001.json
//! snapshot-00000002.json
//! ACTIVE                  # version number of the active snapshot
//! ```
//!
//! Every file is written to a temporary sibling, flushed and renamed into
//! place, so a crash never leaves a torn snapshot or pointer behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::domain::index::{SnapshotStore, VectorIndexSnapshot};
use crate::domain::DomainError;

const ACTIVE_FILE: &str = "ACTIVE";
const SNAPSHOT_PREFIX: &str = "snapshot-";
const SNAPSHOT_SUFFIX: &str = ".json";

/// Snapshot store persisting JSON files in a directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_path(&self, version: u64) -> PathBuf {
        self.dir
            .join(format!("{}{:08}{}", SNAPSHOT_PREFIX, version, SNAPSHOT_SUFFIX))
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_FILE)
    }

    fn parse_version(file_name: &str) -> Option<u64> {
        file_name
            .strip_prefix(SNAPSHOT_PREFIX)?
            .strip_suffix(SNAPSHOT_SUFFIX)?
            .parse()
            .ok()
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            DomainError::storage(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let tmp = path.with_extension("tmp");

        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create {}: {}", tmp.display(), e)))?;
        file.write_all(bytes)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to sync {}: {}", tmp.display(), e)))?;
        drop(file);

        tokio::fs::rename(&tmp, path).await.map_err(|e| {
            DomainError::storage(format!("Failed to rename {}: {}", tmp.display(), e))
        })
    }

    async fn read_active_version(&self) -> Result<Option<u64>, DomainError> {
        let path = self.active_path();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => content.trim().parse().map(Some).map_err(|e| {
                DomainError::storage(format!("Corrupt active pointer {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: &VectorIndexSnapshot) -> Result<(), DomainError> {
        let path = self.snapshot_path(snapshot.version());

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(DomainError::conflict(format!(
                "Snapshot {} already exists",
                snapshot.version()
            )));
        }

        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| DomainError::storage(format!("Failed to serialize snapshot: {}", e)))?;

        self.write_atomic(&path, &bytes).await?;

        debug!(
            version = snapshot.version(),
            bytes = bytes.len(),
            path = %path.display(),
            "Saved index snapshot"
        );
        Ok(())
    }

    async fn load(&self, version: u64) -> Result<Option<VectorIndexSnapshot>, DomainError> {
        let path = self.snapshot_path(version);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let snapshot: VectorIndexSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::storage(format!("Corrupt snapshot {}: {}", path.display(), e))
        })?;

        if snapshot.version() != version {
            return Err(DomainError::storage(format!(
                "Snapshot file {} holds version {}",
                path.display(),
                snapshot.version()
            )));
        }

        snapshot.validate()?;

        Ok(Some(snapshot))
    }

    async fn load_active(&self) -> Result<Option<VectorIndexSnapshot>, DomainError> {
        let Some(version) = self.read_active_version().await? else {
            return Ok(None);
        };

        self.load(version).await?.map(Some).ok_or_else(|| {
            DomainError::storage(format!("Active snapshot {} is missing", version))
        })
    }

    async fn set_active(&self, version: u64) -> Result<(), DomainError> {
        if !tokio::fs::try_exists(self.snapshot_path(version))
            .await
            .unwrap_or(false)
        {
            return Err(DomainError::not_found(format!("Snapshot {} not found", version)));
        }

        self.write_atomic(&self.active_path(), version.to_string().as_bytes())
            .await?;

        info!(version = version, dir = %self.dir.display(), "Active snapshot pointer updated");
        Ok(())
    }

    async fn latest_version(&self) -> Result<Option<u64>, DomainError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to list {}: {}",
                    self.dir.display(),
                    e
                )));
            }
        };

        let mut latest = None;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list snapshots: {}", e)))?
        {
            if let Some(version) = entry.file_name().to_str().and_then(Self::parse_version) {
                latest = latest.max(Some(version));
            }
        }

        Ok(latest)
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}
