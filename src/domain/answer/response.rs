use serde::{Deserialize, Serialize};

/// How an answer came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Synthesized from retrieved rule excerpts
    Answered,
    /// Fixed fallback, nothing relevant was retrieved
    NoRelevantContext,
    /// Generic apology after a failure
    Unavailable,
}

impl AnswerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::NoRelevantContext => "no_relevant_context",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Answer text plus the chunks it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub text: String,
    pub source_chunk_ids: Vec<String>,
    pub outcome: AnswerOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_version: Option<u64>,
}

impl AnswerResponse {
    pub fn answered(text: impl Into<String>, source_chunk_ids: Vec<String>) -> Self {
        Self {
            text: text.into(),
            source_chunk_ids,
            outcome: AnswerOutcome::Answered,
            snapshot_version: None,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_chunk_ids: Vec::new(),
            outcome: AnswerOutcome::NoRelevantContext,
            snapshot_version: None,
        }
    }

    pub fn unavailable(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_chunk_ids: Vec::new(),
            outcome: AnswerOutcome::Unavailable,
            snapshot_version: None,
        }
    }

    pub fn with_snapshot_version(mut self, version: u64) -> Self {
        self.snapshot_version = Some(version);
        self
    }

    /// Source row ids derived from the chunk ids, in citation order
    pub fn source_row_ids(&self) -> Vec<String> {
        let mut rows: Vec<String> = Vec::new();

        for id in &self.source_chunk_ids {
            let row = id.rsplit_once('#').map(|(row, _)| row).unwrap_or(id);
            if !rows.iter().any(|r| r == row) {
                rows.push(row.to_string());
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_has_no_sources() {
        let response = AnswerResponse::fallback("no rule");
        assert_eq!(response.outcome, AnswerOutcome::NoRelevantContext);
        assert!(response.source_chunk_ids.is_empty());
    }

    #[test]
    fn test_source_row_ids() {
        let response = AnswerResponse::answered(
            "14 days",
            vec![
                "r1#000000".to_string(),
                "hr#leave#000120".to_string(),
                "r1#000700".to_string(),
            ],
        );

        assert_eq!(response.source_row_ids(), vec!["r1", "hr#leave"]);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&AnswerOutcome::NoRelevantContext).unwrap();
        assert_eq!(json, "\"no_relevant_context\"");
    }
}
