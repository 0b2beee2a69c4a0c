//! Knowledge source trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::KnowledgeRow;
use crate::domain::DomainError;

/// A producer of knowledge rows (file export, documentation tool API, ...)
#[async_trait]
pub trait KnowledgeSource: Send + Sync + Debug {
    /// Load every row of the current export
    async fn load(&self) -> Result<Vec<KnowledgeRow>, DomainError>;

    /// Human readable description used in logs
    fn describe(&self) -> String;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Source returning a fixed set of rows
    #[derive(Debug, Default)]
    pub struct StaticKnowledgeSource {
        rows: Vec<KnowledgeRow>,
    }

    impl StaticKnowledgeSource {
        pub fn new(rows: Vec<KnowledgeRow>) -> Self {
            Self { rows }
        }
    }

    #[async_trait]
    impl KnowledgeSource for StaticKnowledgeSource {
        async fn load(&self) -> Result<Vec<KnowledgeRow>, DomainError> {
            Ok(self.rows.clone())
        }

        fn describe(&self) -> String {
            format!("static({} rows)", self.rows.len())
        }
    }
}
