use std::{env, str::FromStr, time::Duration};

use url::Url;

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, HuggingFaceConfig, LoggingConfig, PipelineConfig,
};

pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("HUGGINGFACE_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = validate_url(api_url)?;

        let huggingface = HuggingFaceConfig {
            api_key: env::var("HUGGINGFACE_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            api_url,
            classification_model: env::var("CLASSIFICATION_MODEL")
                .unwrap_or_else(|_| "facebook/bart-large-mnli".to_string()),
            generation_model: env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "mistralai/Mistral-7B-Instruct-v0.2".to_string()),
            classify_timeout: Duration::from_millis(parse_or("CLASSIFY_TIMEOUT_MS", 60_000)?),
            generate_timeout: Duration::from_millis(parse_or("GENERATE_TIMEOUT_MS", 120_000)?),
            retry_delay: Duration::from_millis(parse_or("MODEL_LOADING_RETRY_MS", 3_000)?),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            prompt_excerpt_chars: parse_or("PROMPT_EXCERPT_CHARS", defaults.prompt_excerpt_chars)?,
            max_new_tokens: parse_or("GENERATION_MAX_TOKENS", defaults.max_new_tokens)?,
            temperature: parse_or("GENERATION_TEMPERATURE", defaults.temperature)?,
            concurrency: parse_or("TRIAGE_CONCURRENCY", defaults.concurrency)?.max(1),
        };

        let timezone =
            env::var("TRIAGE_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());

        Ok(Self {
            huggingface,
            directories,
            logging,
            pipeline,
            timezone,
        })
    }
}

fn validate_url(raw: String) -> Result<String, ConfigError> {
    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(raw.trim_end_matches('/').to_string())
        }
        Ok(_) => Err(ConfigError::Invalid {
            key: "HUGGINGFACE_API_URL",
            value: raw,
        }),
        Err(source) => Err(ConfigError::Url { value: raw, source }),
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { key, value })
        }
        _ => Ok(default),
    }
}
