//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, EmbeddingSettings, IndexSettings, LlmSettings, LogFormat,
    LoggingConfig, MetricsSettings, ServerConfig,
};
