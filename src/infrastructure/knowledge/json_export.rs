//! Knowledge source reading a JSON export of the rules table

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::knowledge::{validate_rows, KnowledgeRow, KnowledgeSource};
use crate::domain::DomainError;

/// Reads rows from a JSON array file
///
/// Each element holds `id`, `title`, `body` and optionally `category` and
/// `updated_at` (RFC 3339). Unknown fields are ignored.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    path: PathBuf,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse an export already held in memory
    pub fn parse(bytes: &[u8]) -> Result<Vec<KnowledgeRow>, DomainError> {
        let rows: Vec<KnowledgeRow> = serde_json::from_slice(bytes)
            .map_err(|e| DomainError::validation(format!("Invalid knowledge export: {}", e)))?;

        validate_rows(&rows)?;

        Ok(rows)
    }
}

#[async_trait]
impl KnowledgeSource for JsonExportSource {
    async fn load(&self) -> Result<Vec<KnowledgeRow>, DomainError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DomainError::not_found(format!("Knowledge export {} not found", self.path.display()))
            } else {
                DomainError::storage(format!("Failed to read {}: {}", self.path.display(), e))
            }
        })?;

        let rows = Self::parse(&bytes)?;
        debug!(path = %self.path.display(), rows = rows.len(), "Parsed knowledge export");

        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
