//! Knowledge row validation

use std::collections::HashSet;
use std::fmt;

use super::KnowledgeRow;
use crate::domain::DomainError;

/// Maximum length for row IDs
pub const MAX_ROW_ID_LENGTH: usize = 200;

/// Knowledge row validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeRowValidationError {
    /// ID is empty or whitespace
    EmptyId { index: usize },
    /// ID exceeds maximum length
    IdTooLong { id: String, max: usize },
    /// Two rows share an ID
    DuplicateId { id: String },
}

impl fmt::Display for KnowledgeRowValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId { index } => write!(f, "Row {} has an empty id", index),
            Self::IdTooLong { id, max } => {
                write!(f, "Row id '{}' is too long (max {} characters)", id, max)
            }
            Self::DuplicateId { id } => write!(f, "Duplicate row id '{}'", id),
        }
    }
}

impl std::error::Error for KnowledgeRowValidationError {}

impl From<KnowledgeRowValidationError> for DomainError {
    fn from(err: KnowledgeRowValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate that every row has a usable, unique id
pub fn validate_rows(rows: &[KnowledgeRow]) -> Result<(), KnowledgeRowValidationError> {
    let mut seen = HashSet::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        if row.id.trim().is_empty() {
            return Err(KnowledgeRowValidationError::EmptyId { index });
        }

        if row.id.chars().count() > MAX_ROW_ID_LENGTH {
            return Err(KnowledgeRowValidationError::IdTooLong {
                id: row.id.clone(),
                max: MAX_ROW_ID_LENGTH,
            });
        }

        if !seen.insert(row.id.as_str()) {
            return Err(KnowledgeRowValidationError::DuplicateId { id: row.id.clone() });
        }
    }

    Ok(())
}
