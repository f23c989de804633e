pub mod courtesy;
pub mod subject;
pub mod tables;

pub use courtesy::{CourtesyClassifier, Verdict};
pub use subject::{SubjectOverride, SUBJECT_OVERRIDE_CONFIDENCE};
pub use tables::RuleTables;

/// Confidence reported when the courtesy rules settle a message.
pub const COURTESY_CONFIDENCE: f64 = 0.95;
