use serde::Deserialize;

use crate::domain::fingerprint::ModelParams;
use crate::domain::semantic_cache::SemanticCacheConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub semantic_cache: SemanticCacheConfig,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub completion: CompletionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Embedding provider connection
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    /// Vector size; resolved from the model when unset
    #[serde(default)]
    pub dimensions: Option<usize>,
}

/// Completion provider connection and the parameters sent with every prompt
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_completion_params")]
    pub params: ModelParams,
}

const OPENAI_BASE_URL: &str = "https://api.openai.com";

fn default_completion_params() -> ModelParams {
    ModelParams::new("gpt-3.5-turbo-instruct")
        .with_n(2)
        .with_best_of(2)
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
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: String::new(),
            params: default_completion_params(),
        }
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

        config.try_deserialize()
    }
}
