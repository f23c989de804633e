use std::sync::Arc;

use super::tables::RuleTables;

pub const SUBJECT_OVERRIDE_CONFIDENCE: f64 = 0.90;

/// Subject lines naming an inquiry settle the message as actionable.
#[derive(Clone)]
pub struct SubjectOverride {
    tables: Arc<RuleTables>,
}

impl SubjectOverride {
    pub fn new(tables: Arc<RuleTables>) -> Self {
        Self { tables }
    }

    pub fn forces_actionable(&self, subject: &str) -> bool {
        self.tables
            .subject_inquiries
            .matches(&subject.to_lowercase())
    }
}
