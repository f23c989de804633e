//! End-to-end triage of one message.
//!
//! Stages run in a fixed order and the first one that emits a category
//! settles it: subject override, courtesy rules, then the statistical
//! classifier. A reply is always drafted for whichever category came out.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;

use crate::{
    classify::TextClassifier,
    domain::{Category, ClassificationResponse, ClassificationResult, Message},
    reply::ReplyWriter,
    rules::{
        CourtesyClassifier, RuleTables, SubjectOverride, Verdict, COURTESY_CONFIDENCE,
        SUBJECT_OVERRIDE_CONFIDENCE,
    },
    text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SubjectOverride,
    CourtesyCheck,
    RemoteOrFallback,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::SubjectOverride => "subject_override",
            Stage::CourtesyCheck => "courtesy_check",
            Stage::RemoteOrFallback => "remote_or_fallback",
        }
    }
}

pub struct TriagePipeline {
    subject: SubjectOverride,
    courtesy: CourtesyClassifier,
    classifier: Arc<dyn TextClassifier>,
    replies: Arc<dyn ReplyWriter>,
    timezone: Tz,
}

impl TriagePipeline {
    pub fn new(
        tables: Arc<RuleTables>,
        classifier: Arc<dyn TextClassifier>,
        replies: Arc<dyn ReplyWriter>,
        timezone: Tz,
    ) -> Self {
        Self {
            subject: SubjectOverride::new(tables.clone()),
            courtesy: CourtesyClassifier::new(tables),
            classifier,
            replies,
            timezone,
        }
    }

    pub async fn classify(&self, message: &Message) -> ClassificationResponse {
        let merged = message.merged_content();
        let (stage, result) = self.decide(message, &merged).await;

        tracing::info!(
            target: "pipeline",
            stage = stage.as_str(),
            classifier = self.classifier.name(),
            category = %result.category,
            confidence = result.confidence,
            "message classified"
        );

        let reply_text = self.replies.reply_for(&merged, result.category).await;
        tracing::debug!(
            target: "pipeline",
            writer = self.replies.name(),
            chars = reply_text.chars().count(),
            "reply drafted"
        );

        ClassificationResponse {
            category: result.category,
            confidence: result.confidence,
            reply_text,
            merged_content: merged,
            processed_at: Utc::now().with_timezone(&self.timezone).fixed_offset(),
        }
    }

    async fn decide(&self, message: &Message, merged: &str) -> (Stage, ClassificationResult) {
        if let Some(subject) = message.subject() {
            if self.subject.forces_actionable(subject) {
                return (
                    Stage::SubjectOverride,
                    ClassificationResult::new(Category::Actionable, SUBJECT_OVERRIDE_CONFIDENCE),
                );
            }
        }

        let decision = self.courtesy.evaluate(merged);
        if decision.verdict == Verdict::CourtesyOnly {
            tracing::debug!(target: "pipeline", phrase = ?decision.phrase, "courtesy rules matched");
            return (
                Stage::CourtesyCheck,
                ClassificationResult::new(Category::CourtesyOnly, COURTESY_CONFIDENCE),
            );
        }
        if let Some(rule) = decision.rule {
            tracing::debug!(
                target: "pipeline",
                rule,
                phrase = ?decision.phrase,
                "courtesy rules declined"
            );
        }

        let prepared = text::strip_stop_words(&text::normalize(merged));
        tracing::debug!(
            target: "pipeline",
            tokens = ?text::tokenize(&prepared),
            "classifier input prepared"
        );
        (
            Stage::RemoteOrFallback,
            self.classifier.classify(&prepared).await,
        )
    }
}
