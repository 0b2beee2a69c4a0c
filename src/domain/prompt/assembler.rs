//! Prompt assembler
//!
//! Layout of an assembled prompt:
//!
//! ```text
//! Rule excerpts:
//! [r1] Annual leave
//! Employees get 14 days annual leave.
//! ---
//! [r7] Remote work
//! ...
//!
//! Question: How many annual leave days do I get?
//! ```

use serde::Serialize;

use crate::domain::index::{RetrievalResult, ScoredChunk};
use crate::domain::retrieval::Retrieval;

/// Separator placed between two excerpts
pub const CHUNK_SEPARATOR: &str = "\n---\n";

const CONTEXT_HEADER: &str = "Rule excerpts:\n";

/// Prompt text plus the chunks that made it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledPrompt {
    pub text: String,
    pub used_chunk_ids: Vec<String>,
    pub source_row_ids: Vec<String>,
}

impl AssembledPrompt {
    pub fn is_grounded(&self) -> bool {
        !self.used_chunk_ids.is_empty()
    }
}

/// Builds grounded prompts from retrieval results
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    /// Assemble a prompt from hits in the order given (best first)
    ///
    /// Excerpts are appended while the context section stays within
    /// `budget` characters; the first excerpt that does not fit ends the
    /// context.
    pub fn assemble(question: &str, result: &RetrievalResult, budget: usize) -> AssembledPrompt {
        let mut context = String::new();
        let mut used = 0usize;
        let mut used_chunk_ids = Vec::new();
        let mut source_row_ids = Vec::new();

        for hit in result.hits() {
            let excerpt = Self::excerpt(hit);
            let extra = if used_chunk_ids.is_empty() {
                excerpt.chars().count()
            } else {
                CHUNK_SEPARATOR.chars().count() + excerpt.chars().count()
            };

            if used + extra > budget {
                break;
            }

            if !used_chunk_ids.is_empty() {
                context.push_str(CHUNK_SEPARATOR);
            }
            context.push_str(&excerpt);
            used += extra;

            used_chunk_ids.push(hit.chunk.chunk_id.clone());
            if !source_row_ids.contains(&hit.chunk.source_row_id) {
                source_row_ids.push(hit.chunk.source_row_id.clone());
            }
        }

        let text = format!(
            "{}{}\n\nQuestion: {}",
            CONTEXT_HEADER,
            context,
            question.trim()
        );

        AssembledPrompt {
            text,
            used_chunk_ids,
            source_row_ids,
        }
    }

    fn excerpt(hit: &ScoredChunk) -> String {
        let title = hit.chunk.title.trim();

        if title.is_empty() {
            format!("[{}]\n{}", hit.chunk.source_row_id, hit.chunk.text)
        } else {
            format!("[{}] {}\n{}", hit.chunk.source_row_id, title, hit.chunk.text)
        }
    }
}

/// Input of the answer synthesizer
#[derive(Debug, Clone, PartialEq)]
pub enum PromptContext {
    Grounded(AssembledPrompt),
    NoRelevantContext,
}

impl PromptContext {
    /// Assemble a prompt for a retrieval outcome
    ///
    /// A retrieval whose best excerpt alone exceeds the budget yields no
    /// grounded prompt and is treated like no relevant context.
    pub fn assemble(question: &str, retrieval: &Retrieval, budget: usize) -> Self {
        match retrieval {
            Retrieval::NoRelevantContext => Self::NoRelevantContext,
            Retrieval::Relevant(result) => {
                let prompt = PromptAssembler::assemble(question, result, budget);

                if prompt.is_grounded() {
                    Self::Grounded(prompt)
                } else {
                    Self::NoRelevantContext
                }
            }
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, Self::Grounded(_))
    }
}
