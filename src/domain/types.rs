use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Needs a response or some action.
    Actionable,
    /// Social or ceremonial, nothing to do.
    CourtesyOnly,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Actionable => "Actionable",
            Category::CourtesyOnly => "CourtesyOnly",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "actionable" | "produtivo" => Ok(Category::Actionable),
            "courtesyonly" | "courtesy_only" | "improdutivo" => Ok(Category::CourtesyOnly),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f64,
}

impl ClassificationResult {
    /// Builds a result with the confidence forced into `[0, 1]`.
    pub fn new(category: Category, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            category,
            confidence,
        }
    }
}

/// Parallel label/score lists as returned by a zero-shot model, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZeroShotScores {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotScores {
    pub fn top(&self) -> Option<(&str, f64)> {
        let label = self.labels.first()?;
        let score = self.scores.first()?;
        Some((label.as_str(), *score))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResponse {
    pub category: Category,
    pub confidence: f64,
    pub reply_text: String,
    pub merged_content: String,
    pub processed_at: DateTime<FixedOffset>,
}
