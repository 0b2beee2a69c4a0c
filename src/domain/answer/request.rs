use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Maximum accepted question length in characters
pub const MAX_QUESTION_LENGTH: usize = 2000;

/// A question asked by an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question: String,
}

impl AnswerRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.question.trim().is_empty() {
            return Err(DomainError::validation("question must not be empty"));
        }

        if self.question.chars().count() > MAX_QUESTION_LENGTH {
            return Err(DomainError::validation(format!(
                "question exceeds {} characters",
                MAX_QUESTION_LENGTH
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_question() {
        assert!(AnswerRequest::new("Can I work remotely?").validate().is_ok());
        assert!(AnswerRequest::new("   ").validate().is_err());
        assert!(AnswerRequest::new("x".repeat(MAX_QUESTION_LENGTH + 1))
            .validate()
            .is_err());
    }
}
