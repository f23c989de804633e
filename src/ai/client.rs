use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::{config::HuggingFaceConfig, domain::ZeroShotScores};

use super::{
    inference::{
        build_generation_request, build_zero_shot_request, parse_generation, parse_zero_shot,
        GenerationOptions,
    },
    RemoteError, TextGenerationBackend, ZeroShotBackend,
};

/// Hosted inference endpoint serving both the zero-shot and the
/// instruction-tuned generation model.
#[derive(Clone)]
pub struct HuggingFaceClient {
    http: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceClient {
    pub fn new(http: Client, config: HuggingFaceConfig) -> Self {
        Self { http, config }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        model: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<Value, RemoteError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(RemoteError::MissingApiKey)?;

        let url = format!("{}/{}", self.config.api_url, model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RemoteError::Timeout {
                        model: model.to_string(),
                    }
                } else {
                    RemoteError::Http(err)
                }
            })?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(RemoteError::Unavailable {
                model: model.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RemoteError::Status {
                model: model.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| RemoteError::Malformed(err.to_string()))
    }
}

#[async_trait]
impl ZeroShotBackend for HuggingFaceClient {
    async fn zero_shot(&self, text: &str, labels: &[&str]) -> Result<ZeroShotScores, RemoteError> {
        let request = build_zero_shot_request(text, labels);
        let value = self
            .post(
                &self.config.classification_model,
                &request,
                self.config.classify_timeout,
            )
            .await?;
        parse_zero_shot(value)
    }
}

#[async_trait]
impl TextGenerationBackend for HuggingFaceClient {
    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, RemoteError> {
        let request = build_generation_request(prompt, options);
        let value = self
            .post(
                &self.config.generation_model,
                &request,
                self.config.generate_timeout,
            )
            .await?;
        parse_generation(value)
    }
}
