use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub huggingface: HuggingFaceConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub timezone: String,
}

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub classification_model: String,
    pub generation_model: String,
    pub classify_timeout: Duration,
    pub generate_timeout: Duration,
    /// Wait before the single retry after a "model loading" answer.
    pub retry_delay: Duration,
}

impl HuggingFaceConfig {
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub prompt_excerpt_chars: usize,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prompt_excerpt_chars: 500,
            max_new_tokens: 300,
            temperature: 0.7,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("invalid endpoint url {value:?}: {source}")]
    Url {
        value: String,
        #[source]
        source: url::ParseError,
    },
}
