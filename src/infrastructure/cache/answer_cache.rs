//! In-memory answer cache using moka
//!
//! Keys combine the snapshot version with the normalized question, so
//! publishing a new snapshot makes every older entry unreachable.

use std::time::Duration;

use moka::future::Cache as MokaCache;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::answer::{AnswerOutcome, AnswerResponse};

/// Punctuation, separators (spaces) and control characters
static IGNORED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{P}\p{Z}\p{C}]+").unwrap());

/// Canonical form of a question used as cache key
///
/// "How many leave days?" and "how many  leave-days" map to the same key.
pub fn normalize_question(question: &str) -> String {
    IGNORED_CHARS.replace_all(question, "").to_lowercase()
}

/// Configuration for the answer cache
#[derive(Debug, Clone)]
pub struct AnswerCacheConfig {
    pub max_capacity: u64,
    pub ttl: Duration,
}

impl Default for AnswerCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            ttl: Duration::from_secs(600),
        }
    }
}

/// Cache of synthesized answers per snapshot version
#[derive(Debug, Clone)]
pub struct AnswerCache {
    cache: MokaCache<(u64, String), AnswerResponse>,
}

impl AnswerCache {
    pub fn new(config: AnswerCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, version: u64, question: &str) -> Option<AnswerResponse> {
        let key = normalize_question(question);
        if key.is_empty() {
            return None;
        }

        self.cache.get(&(version, key)).await
    }

    /// Store an answer; only grounded answers are cached
    pub async fn insert(&self, version: u64, question: &str, answer: &AnswerResponse) {
        if answer.outcome != AnswerOutcome::Answered {
            return;
        }

        let key = normalize_question(question);
        if key.is_empty() {
            return;
        }

        self.cache.insert((version, key), answer.clone()).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl Default for AnswerCache {
    fn default() -> Self {
        Self::new(AnswerCacheConfig::default())
    }
}
