//! Remote model access. Everything here may fail; callers decide how to
//! degrade.

mod client;
mod error;
pub mod inference;

use async_trait::async_trait;

use crate::domain::ZeroShotScores;

pub use client::HuggingFaceClient;
pub use error::RemoteError;
pub use inference::{GenerationOptions, ACTION_LABEL, COURTESY_LABEL};

/// Scores `text` against arbitrary candidate labels.
#[async_trait]
pub trait ZeroShotBackend: Send + Sync {
    async fn zero_shot(&self, text: &str, labels: &[&str]) -> Result<ZeroShotScores, RemoteError>;
}

#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str, options: GenerationOptions)
        -> Result<String, RemoteError>;
}
