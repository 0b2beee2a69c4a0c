//! Knowledge base rows as exported from the documentation tool

mod row;
mod source;
mod validation;

pub use row::KnowledgeRow;
pub use source::KnowledgeSource;
pub use validation::{validate_rows, KnowledgeRowValidationError, MAX_ROW_ID_LENGTH};

#[cfg(test)]
pub use source::mock::StaticKnowledgeSource;
