//! The query path: retrieve, assemble, synthesize

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, instrument, warn};

use crate::domain::answer::AnswerResponse;
use crate::domain::prompt::{PromptContext, DEFAULT_APOLOGY};
use crate::domain::{DomainError, VectorIndexSnapshot};
use crate::infrastructure::answer::AnswerSynthesizer;
use crate::infrastructure::cache::AnswerCache;
use crate::infrastructure::index::ActiveIndex;
use crate::infrastructure::observability::record_answer;
use crate::infrastructure::retrieval::Retriever;

/// Configuration for the answer service
#[derive(Debug, Clone)]
pub struct AnswerServiceConfig {
    /// Context budget in characters
    pub budget_chars: usize,
    /// Text returned when no answer could be produced
    pub apology: String,
    /// Total synthesis attempts on recoverable failures
    pub synthesis_attempts: usize,
}

impl Default for AnswerServiceConfig {
    fn default() -> Self {
        Self {
            budget_chars: 6000,
            apology: DEFAULT_APOLOGY.to_string(),
            synthesis_attempts: 2,
        }
    }
}

/// Answers employee questions against the active index
///
/// Queries only read shared state: each one pulls the active snapshot once
/// and uses it throughout.
#[derive(Debug)]
pub struct AnswerService {
    active: Arc<ActiveIndex>,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    cache: Option<AnswerCache>,
    config: AnswerServiceConfig,
}

impl AnswerService {
    pub fn new(
        active: Arc<ActiveIndex>,
        retriever: Retriever,
        synthesizer: AnswerSynthesizer,
        config: AnswerServiceConfig,
    ) -> Self {
        Self {
            active,
            retriever,
            synthesizer,
            cache: None,
            config,
        }
    }

    pub fn with_cache(mut self, cache: AnswerCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Answer a question; never fails
    ///
    /// Errors are logged and turned into the apology with outcome
    /// `Unavailable`. Internal detail never reaches the returned text.
    #[instrument(skip(self, question), fields(question_chars = question.chars().count()))]
    pub async fn answer_question(&self, question: &str) -> AnswerResponse {
        let started = Instant::now();
        let snapshot = self.active.current();
        let version = snapshot.version();

        if let Some(cache) = &self.cache {
            if let Some(answer) = cache.get(version, question).await {
                debug!(snapshot_version = version, "Answer served from cache");
                record_answer(answer.outcome, true, started.elapsed());
                return answer;
            }
        }

        let answer = match self.try_answer(question, &snapshot).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, snapshot_version = version, "Could not answer question");
                AnswerResponse::unavailable(self.config.apology.clone())
            }
        }
        .with_snapshot_version(version);

        if let Some(cache) = &self.cache {
            cache.insert(version, question, &answer).await;
        }

        record_answer(answer.outcome, false, started.elapsed());
        answer
    }

    async fn try_answer(
        &self,
        question: &str,
        snapshot: &VectorIndexSnapshot,
    ) -> Result<AnswerResponse, DomainError> {
        let retrieval = self
            .retriever
            .retrieve(question, snapshot, self.retriever.config().top_k)
            .await?;

        let context = PromptContext::assemble(question, &retrieval, self.config.budget_chars);

        let attempts = self.config.synthesis_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.synthesizer.synthesize(&context, question).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_recoverable() && attempt < attempts => {
                    warn!(attempt = attempt, error = %e, "Synthesis failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
