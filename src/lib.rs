//! Rulebook Assistant
//!
//! Answers employee questions about internal company rules from an
//! exported knowledge base:
//! - Sentence-aware chunking and batch embedding of knowledge rows
//! - Immutable, versioned vector index snapshots with atomic publication
//! - Similarity retrieval with a relevance threshold
//! - Budgeted prompt assembly and grounded answer synthesis

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use api::state::AppState;
use domain::DomainError;
use infrastructure::{
    answer::{AnswerSynthesizer, SynthesizerConfig},
    cache::{AnswerCache, AnswerCacheConfig},
    chunking::SentenceChunker,
    embedding::{Embedder, OpenAiEmbeddingProvider},
    index::{ActiveIndex, FileSnapshotStore, IndexBuilder, IndexBuilderConfig},
    knowledge::JsonExportSource,
    llm::{HttpClient, OpenAiProvider},
    observability::PrometheusMetrics,
    retrieval::Retriever,
    services::{AnswerService, AnswerServiceConfig, IndexService},
};
use tracing::info;

/// The wired services of one process
#[derive(Debug, Clone)]
pub struct Services {
    pub answer: Arc<AnswerService>,
    pub index: Arc<IndexService>,
}

/// Wire every component from configuration
pub fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    config.validate().context("Invalid configuration")?;

    let embedding_key = require_api_key(&config.embedding.api_key, "embedding")?;
    let llm_key = require_api_key(&config.llm.api_key, "llm")?;

    let embedding_provider = OpenAiEmbeddingProvider::with_base_url(
        HttpClient::with_timeout(config.embedding.timeout())?,
        embedding_key,
        config.embedding.base_url.as_str(),
    );
    let mut embedder = Embedder::new(Arc::new(embedding_provider), config.embedding.model.as_str())
        .with_timeout(config.embedding.timeout());
    if let Some(dimensions) = config.embedding.dimensions {
        embedder = embedder.with_dimensions(dimensions);
    }

    let llm = OpenAiProvider::with_base_url(
        HttpClient::with_timeout(config.llm.timeout())?,
        llm_key,
        config.llm.base_url.as_str(),
    );

    let metric = config.retrieval.metric;
    let active = Arc::new(ActiveIndex::new(metric));

    let builder = IndexBuilder::new(
        Arc::new(SentenceChunker::new(config.chunking.clone())?),
        embedder.clone(),
        Arc::new(FileSnapshotStore::new(&config.index.snapshot_dir)),
        active.clone(),
        IndexBuilderConfig {
            batch_size: config.embedding.batch_size,
            metric,
        },
    );

    let synthesizer = AnswerSynthesizer::new(
        Arc::new(llm),
        SynthesizerConfig {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            timeout: config.llm.timeout(),
            system_instruction: config.prompt.system_instruction.clone(),
            fallback_answer: config.prompt.fallback_answer.clone(),
        },
    );

    let mut answer = AnswerService::new(
        active,
        Retriever::new(embedder, config.retrieval.clone()),
        synthesizer,
        AnswerServiceConfig {
            budget_chars: config.prompt.budget_chars,
            apology: config.prompt.apology.clone(),
            ..Default::default()
        },
    );

    let mut index = IndexService::new(
        Arc::new(builder),
        Arc::new(JsonExportSource::new(&config.index.export_path)),
    );

    if config.cache.enabled {
        let cache = AnswerCache::new(AnswerCacheConfig {
            max_capacity: config.cache.max_capacity,
            ttl: config.cache.ttl(),
        });
        answer = answer.with_cache(cache.clone());
        index = index.with_cache(cache);
    }

    info!(
        embedding_model = %config.embedding.model,
        llm_model = %config.llm.model,
        metric = %metric,
        snapshot_dir = %config.index.snapshot_dir.display(),
        cache = config.cache.enabled,
        "Services initialized"
    );

    Ok(Services {
        answer: Arc::new(answer),
        index: Arc::new(index),
    })
}

/// Create the HTTP application state from wired services
pub fn create_app_state(services: &Services, metrics: Option<PrometheusMetrics>) -> AppState {
    AppState::new(services.answer.clone(), services.index.clone()).with_metrics(metrics)
}

fn require_api_key(key: &Option<String>, section: &str) -> Result<String, DomainError> {
    key.clone().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
        DomainError::configuration(format!(
            "{}.api_key is not set (APP_{}__API_KEY or OPENAI_API_KEY)",
            section,
            section.to_uppercase()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = build_services(&AppConfig::default()).unwrap_err();
        let domain = err.downcast_ref::<DomainError>().unwrap();

        assert!(matches!(domain, DomainError::Configuration { .. }));
        assert!(domain.to_string().contains("embedding.api_key"));
    }

    #[test]
    fn test_build_services_with_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.embedding.api_key = Some("sk-test".to_string());
        config.llm.api_key = Some("sk-test".to_string());
        config.index.snapshot_dir = dir.path().join("snapshots");

        let services = build_services(&config).unwrap();
        let overview = services.index.overview();

        assert!(!overview.status.loaded);
        assert_eq!(overview.source, format!("json:{}", config.index.export_path.display()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;

        assert!(build_services(&config).is_err());
    }
}
