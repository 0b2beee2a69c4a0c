//! Answer cache

mod answer_cache;

pub use answer_cache::{normalize_question, AnswerCache, AnswerCacheConfig};
