use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::chunking::ChunkingConfig;
use crate::domain::prompt::PromptConfig;
use crate::domain::retrieval::RetrievalConfig;
use crate::domain::DomainError;

const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub prompt: PromptConfig,
    pub index: IndexSettings,
    pub cache: CacheSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Embedding capability settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Expected vector length; a snapshot of another length is refused
    pub dimensions: Option<usize>,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

/// Chat capability settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub snapshot_dir: PathBuf,
    pub export_path: PathBuf,
    /// Build from the export at startup when no snapshot is stored
    pub build_on_start: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub max_capacity: u64,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            batch_size: 64,
            timeout_secs: 15,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 512,
            timeout_secs: 20,
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("data/snapshots"),
            export_path: PathBuf::from("data/knowledge.json"),
            build_on_start: false,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 1000,
            ttl_secs: 600,
        }
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl EmbeddingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: Self = config.try_deserialize()?;
        app.apply_env_api_key(std::env::var("OPENAI_API_KEY").ok());

        Ok(app)
    }

    /// Fill missing API keys from the shared OpenAI key
    fn apply_env_api_key(&mut self, key: Option<String>) {
        let Some(key) = key.filter(|k| !k.trim().is_empty()) else {
            return;
        };

        if self.embedding.api_key.is_none() {
            self.embedding.api_key = Some(key.clone());
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.prompt.validate()?;

        if self.embedding.batch_size == 0 {
            return Err(DomainError::validation(
                "embedding.batch_size must be greater than 0",
            ));
        }

        if self.embedding.dimensions == Some(0) {
            return Err(DomainError::validation(
                "embedding.dimensions must be greater than 0 when set",
            ));
        }

        if self.cache.enabled && self.cache.max_capacity == 0 {
            return Err(DomainError::validation(
                "cache.max_capacity must be greater than 0 when the cache is enabled",
            ));
        }

        Ok(())
    }
}
