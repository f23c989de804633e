//! Courtesy-only detection.
//!
//! Rules are evaluated top to bottom and the first one that applies decides.
//! Negative signals come first so that a polite opener never hides a request
//! further down the message.

use std::sync::Arc;

use super::tables::{PhraseSet, RuleTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    CourtesyOnly,
    NotCourtesy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtesyDecision {
    pub verdict: Verdict,
    /// Name of the rule that decided; `None` when nothing applied.
    pub rule: Option<&'static str>,
    /// First phrase of the rule's table found in the text, if any.
    pub phrase: Option<&'static str>,
}

struct CourtesyRule {
    name: &'static str,
    applies: fn(&RuleTables, &str) -> bool,
    table: fn(&RuleTables) -> &PhraseSet,
    verdict: Verdict,
}

const RULES: &[CourtesyRule] = &[
    CourtesyRule {
        name: "direct_question",
        applies: |_, text| text.contains('?'),
        table: |tables| &tables.question_markers,
        verdict: Verdict::NotCourtesy,
    },
    CourtesyRule {
        name: "forward_request",
        applies: |tables, text| tables.forward_requests.matches(text),
        table: |tables| &tables.forward_requests,
        verdict: Verdict::NotCourtesy,
    },
    CourtesyRule {
        name: "unresolved_question",
        applies: |tables, text| {
            tables.new_questions.matches(text) && !tables.past_references.matches(text)
        },
        table: |tables| &tables.new_questions,
        verdict: Verdict::NotCourtesy,
    },
    CourtesyRule {
        name: "domain_inquiry",
        applies: |tables, text| {
            tables.domain_inquiries.matches(text) && !tables.past_references.matches(text)
        },
        table: |tables| &tables.domain_inquiries,
        verdict: Verdict::NotCourtesy,
    },
    CourtesyRule {
        name: "courtesy_with_action",
        applies: |tables, text| has_courtesy_phrase(tables, text) && tables.has_action_verb(text),
        table: |tables| &tables.action_verbs,
        verdict: Verdict::NotCourtesy,
    },
    CourtesyRule {
        name: "courtesy_phrase",
        applies: has_courtesy_phrase,
        table: |tables| &tables.courtesy_phrases,
        verdict: Verdict::CourtesyOnly,
    },
];

fn has_courtesy_phrase(tables: &RuleTables, text: &str) -> bool {
    tables.courtesy_phrases.matches(text)
        || tables.congratulations.matches(text)
        || tables.well_wishing.matches(text)
        || (tables.past_references.matches(text) && !tables.new_questions.matches(text))
}

#[derive(Clone)]
pub struct CourtesyClassifier {
    tables: Arc<RuleTables>,
}

impl CourtesyClassifier {
    pub fn new(tables: Arc<RuleTables>) -> Self {
        Self { tables }
    }

    pub fn evaluate(&self, full_text: &str) -> CourtesyDecision {
        let text = full_text.to_lowercase();
        let tables: &RuleTables = &self.tables;
        RULES
            .iter()
            .find(|rule| (rule.applies)(tables, &text))
            .map(|rule| CourtesyDecision {
                verdict: rule.verdict,
                rule: Some(rule.name),
                phrase: (rule.table)(tables).first_match(&text),
            })
            .unwrap_or(CourtesyDecision {
                verdict: Verdict::NotCourtesy,
                rule: None,
                phrase: None,
            })
    }
}
