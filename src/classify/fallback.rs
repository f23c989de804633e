use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{Category, ClassificationResult},
    rules::RuleTables,
};

use super::TextClassifier;

const CEILING: f64 = 0.95;
const NO_SIGNAL_CONFIDENCE: f64 = 0.60;

/// Keyword-frequency scorer. Deterministic and network-free.
#[derive(Clone)]
pub struct FallbackClassifier {
    tables: Arc<RuleTables>,
}

impl FallbackClassifier {
    pub fn new(tables: Arc<RuleTables>) -> Self {
        Self { tables }
    }

    pub fn classify_text(&self, text: &str) -> ClassificationResult {
        let text = text.to_lowercase();
        let productive = self.tables.productive_keywords.count_distinct(&text);
        let unproductive = self.tables.unproductive_keywords.count_distinct(&text);

        let (category, confidence) = if self.tables.fallback_has_question(&text)
            && !self.tables.is_clear_greeting(&text)
        {
            (Category::Actionable, scaled(0.85, productive))
        } else if productive > 0 {
            if unproductive >= productive {
                (Category::CourtesyOnly, scaled(0.70, unproductive))
            } else {
                (Category::Actionable, scaled(0.75, productive))
            }
        } else if unproductive > 0 {
            (Category::CourtesyOnly, scaled(0.70, unproductive))
        } else {
            (Category::Actionable, NO_SIGNAL_CONFIDENCE)
        };

        tracing::debug!(
            target: "classify",
            productive,
            unproductive,
            category = %category,
            confidence,
            "fallback classification"
        );
        ClassificationResult::new(category, confidence)
    }
}

fn scaled(base: f64, hits: usize) -> f64 {
    (base + 0.05 * hits as f64).min(CEILING)
}

#[async_trait]
impl TextClassifier for FallbackClassifier {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn classify(&self, text: &str) -> ClassificationResult {
        self.classify_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> FallbackClassifier {
        FallbackClassifier::new(Arc::new(RuleTables::portuguese().unwrap()))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn empty_text_defaults_to_actionable() {
        let result = classifier().classify_text("");
        assert_eq!(result.category, Category::Actionable);
        assert_close(result.confidence, 0.60);
    }

    #[test]
    fn productive_majority_is_actionable() {
        let result = classifier().classify_text("segue contrato relatório pagamento. obrigado.");
        assert_eq!(result.category, Category::Actionable);
        assert_close(result.confidence, 0.90);
    }

    #[test]
    fn unproductive_tie_or_majority_is_courtesy() {
        let result = classifier().classify_text("obrigado pelo relatório, abraços");
        assert_eq!(result.category, Category::CourtesyOnly);
        assert_close(result.confidence, 0.80);
    }

    #[test]
    fn only_unproductive_is_courtesy() {
        let result = classifier().classify_text("bom dia, abraços");
        assert_eq!(result.category, Category::CourtesyOnly);
        assert_close(result.confidence, 0.80);
    }

    #[test]
    fn question_signal_wins_and_caps() {
        let result = classifier().classify_text("status pedido contrato pagamento prazo?");
        assert_eq!(result.category, Category::Actionable);
        assert_close(result.confidence, 0.95);
    }

    #[test]
    fn greeting_suppresses_question_shortcut() {
        let result = classifier().classify_text("feliz natal! gostaria confirmar prazo entrega.");
        assert_eq!(result.category, Category::Actionable);
        assert_close(result.confidence, 0.90);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let classifier = classifier();
        let text = "preciso do documento atualizado";
        assert_eq!(classifier.classify_text(text), classifier.classify_text(text));
    }
}
