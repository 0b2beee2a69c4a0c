//! Retrieval outcome

use crate::domain::index::RetrievalResult;

/// What a retrieval produced
///
/// `NoRelevantContext` is a normal outcome, not an error: nothing in the
/// index cleared the similarity threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Relevant(RetrievalResult),
    NoRelevantContext,
}

impl Retrieval {
    /// Classify an already thresholded result
    pub fn from_result(result: RetrievalResult) -> Self {
        if result.is_empty() {
            Self::NoRelevantContext
        } else {
            Self::Relevant(result)
        }
    }

    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Relevant(_))
    }

    pub fn result(&self) -> Option<&RetrievalResult> {
        match self {
            Self::Relevant(result) => Some(result),
            Self::NoRelevantContext => None,
        }
    }

    pub fn chunk_ids(&self) -> Vec<String> {
        self.result().map(|r| r.chunk_ids()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_means_no_context() {
        let retrieval = Retrieval::from_result(RetrievalResult::empty());
        assert_eq!(retrieval, Retrieval::NoRelevantContext);
        assert!(!retrieval.is_relevant());
        assert!(retrieval.chunk_ids().is_empty());
    }
}
