//! Statistical classification behind one capability trait. The pipeline
//! holds a `dyn TextClassifier` and never learns which implementation
//! answered.

mod fallback;
mod remote;

use async_trait::async_trait;

use crate::domain::ClassificationResult;

pub use fallback::FallbackClassifier;
pub use remote::RemoteClassifier;

#[async_trait]
pub trait TextClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Never fails; implementations degrade internally.
    async fn classify(&self, text: &str) -> ClassificationResult;
}
