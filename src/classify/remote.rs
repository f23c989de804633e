use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::time::sleep;

use crate::{
    ai::{RemoteError, ZeroShotBackend, ACTION_LABEL, COURTESY_LABEL},
    domain::{Category, ClassificationResult, ZeroShotScores},
    rules::RuleTables,
};

use super::{FallbackClassifier, TextClassifier};

/// Floor applied when an explicit question overrides the model's label.
const QUESTION_FLOOR: f64 = 0.85;

/// Zero-shot model classification with one retry while the model warms up.
/// Any failure is answered by the wrapped [`FallbackClassifier`].
pub struct RemoteClassifier {
    backend: Arc<dyn ZeroShotBackend>,
    tables: Arc<RuleTables>,
    fallback: FallbackClassifier,
    retry_delay: Duration,
}

impl RemoteClassifier {
    pub fn new(
        backend: Arc<dyn ZeroShotBackend>,
        tables: Arc<RuleTables>,
        retry_delay: Duration,
    ) -> Self {
        let fallback = FallbackClassifier::new(tables.clone());
        Self {
            backend,
            tables,
            fallback,
            retry_delay,
        }
    }

    pub async fn classify_remote(&self, text: &str) -> Result<ClassificationResult, RemoteError> {
        let labels = [ACTION_LABEL, COURTESY_LABEL];
        let scores = match self.backend.zero_shot(text, &labels).await {
            Err(err) if err.is_transient() => {
                tracing::info!(
                    target: "classify",
                    error = %err,
                    delay_ms = self.retry_delay.as_millis() as u64,
                    "model unavailable, retrying once"
                );
                sleep(self.retry_delay).await;
                self.backend.zero_shot(text, &labels).await?
            }
            other => other?,
        };
        self.interpret(&scores, text)
    }

    fn interpret(
        &self,
        scores: &ZeroShotScores,
        text: &str,
    ) -> Result<ClassificationResult, RemoteError> {
        let (label, score) = scores
            .top()
            .ok_or_else(|| RemoteError::Malformed("no labels to interpret".into()))?;

        let text = text.to_lowercase();
        if self.tables.has_question(&text) && !self.tables.is_clear_greeting(&text) {
            return Ok(ClassificationResult::new(
                Category::Actionable,
                score.max(QUESTION_FLOOR),
            ));
        }

        Ok(ClassificationResult::new(label_category(label), score))
    }
}

/// Bare category names map directly; descriptive labels go by wording.
fn label_category(label: &str) -> Category {
    label.parse().unwrap_or_else(|_| {
        if is_courtesy_label(label) {
            Category::CourtesyOnly
        } else {
            Category::Actionable
        }
    })
}

fn is_courtesy_label(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("cortesia")
        || label.contains("apenas")
        || (label.contains("sem") && label.contains("solicitação"))
}

#[async_trait]
impl TextClassifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(&self, text: &str) -> ClassificationResult {
        match self.classify_remote(text).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    target: "classify",
                    error = %err,
                    "remote classification failed, using fallback"
                );
                self.fallback.classify_text(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use tokio::sync::Mutex;

    use super::*;

    /// Replays canned answers in order.
    struct ScriptedBackend {
        answers: Mutex<VecDeque<Result<ZeroShotScores, RemoteError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(answers: Vec<Result<ZeroShotScores, RemoteError>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ZeroShotBackend for ScriptedBackend {
        async fn zero_shot(
            &self,
            _text: &str,
            labels: &[&str],
        ) -> Result<ZeroShotScores, RemoteError> {
            assert_eq!(labels, &[ACTION_LABEL, COURTESY_LABEL]);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(RemoteError::Malformed("script exhausted".into())))
        }
    }

    fn unavailable() -> Result<ZeroShotScores, RemoteError> {
        Err(RemoteError::Unavailable {
            model: "zero-shot".into(),
        })
    }

    fn ranked(top: &str, score: f64) -> Result<ZeroShotScores, RemoteError> {
        let other = if top == ACTION_LABEL {
            COURTESY_LABEL
        } else {
            ACTION_LABEL
        };
        Ok(ZeroShotScores {
            labels: vec![top.to_string(), other.to_string()],
            scores: vec![score, 1.0 - score],
        })
    }

    fn classifier(backend: Arc<ScriptedBackend>) -> RemoteClassifier {
        let tables = Arc::new(RuleTables::portuguese().unwrap());
        RemoteClassifier::new(backend, tables, Duration::ZERO)
    }

    #[tokio::test]
    async fn maps_courtesy_label() {
        let backend = ScriptedBackend::new(vec![ranked(COURTESY_LABEL, 0.77)]);
        let result = classifier(backend).classify("boas festas equipe").await;
        assert_eq!(result.category, Category::CourtesyOnly);
        assert!((result.confidence - 0.77).abs() < 1e-9);
    }

    #[tokio::test]
    async fn question_overrides_weak_label() {
        let backend = ScriptedBackend::new(vec![ranked(COURTESY_LABEL, 0.55)]);
        let result = classifier(backend).classify("recebi boleto errado?").await;
        assert_eq!(result.category, Category::Actionable);
        assert!((result.confidence - 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn question_override_keeps_higher_score() {
        let backend = ScriptedBackend::new(vec![ranked(ACTION_LABEL, 0.93)]);
        let result = classifier(backend).classify("status pedido?").await;
        assert_eq!(result.category, Category::Actionable);
        assert!((result.confidence - 0.93).abs() < 1e-9);
    }

    #[tokio::test]
    async fn retries_once_after_model_loading() {
        let backend = ScriptedBackend::new(vec![unavailable(), ranked(ACTION_LABEL, 0.66)]);
        let result = classifier(backend.clone()).classify("segue planilha anexa").await;
        assert_eq!(backend.calls(), 2);
        assert_eq!(result.category, Category::Actionable);
        assert!((result.confidence - 0.66).abs() < 1e-9);
    }

    #[tokio::test]
    async fn two_transient_failures_fall_back() {
        let text = "segue contrato relatório pagamento. obrigado.";
        let backend = ScriptedBackend::new(vec![unavailable(), unavailable()]);
        let remote = classifier(backend.clone());

        let result = remote.classify(text).await;
        let expected = remote.fallback.classify_text(text);
        assert_eq!(backend.calls(), 2);
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn other_failures_do_not_retry() {
        let backend = ScriptedBackend::new(vec![Err(RemoteError::Status {
            model: "zero-shot".into(),
            status: 500,
        })]);
        let result = classifier(backend.clone()).classify("").await;
        assert_eq!(backend.calls(), 1);
        assert_eq!(result.category, Category::Actionable);
        assert!((result.confidence - 0.60).abs() < 1e-9);
    }

    #[test]
    fn courtesy_label_detection() {
        assert!(is_courtesy_label(COURTESY_LABEL));
        assert!(!is_courtesy_label(ACTION_LABEL));
        assert!(is_courtesy_label("Mensagem SEM nenhuma solicitação"));
    }

    #[test]
    fn category_named_labels_map_directly() {
        assert_eq!(label_category("Improdutivo"), Category::CourtesyOnly);
        assert_eq!(label_category("Produtivo"), Category::Actionable);
        assert_eq!(label_category(COURTESY_LABEL), Category::CourtesyOnly);
        assert_eq!(label_category(ACTION_LABEL), Category::Actionable);
    }
}
