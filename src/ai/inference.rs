use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ZeroShotScores;

use super::RemoteError;

/// Candidate label for messages that need an answer.
pub const ACTION_LABEL: &str = "email que requer ação ou resposta";
/// Candidate label for pleasantries.
pub const COURTESY_LABEL: &str = "email apenas de cortesia, sem solicitação";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

pub fn build_zero_shot_request<'a>(text: &'a str, labels: &'a [&'a str]) -> ZeroShotRequest<'a> {
    ZeroShotRequest {
        inputs: text,
        parameters: ZeroShotParameters {
            candidate_labels: labels,
        },
    }
}

pub fn build_generation_request(prompt: &str, options: GenerationOptions) -> GenerationRequest<'_> {
    GenerationRequest {
        inputs: prompt,
        parameters: GenerationParameters {
            max_new_tokens: options.max_new_tokens,
            temperature: options.temperature,
            return_full_text: false,
        },
    }
}

/// Accepts `{labels, scores}` as well as `[{label, score}, ...]` and returns
/// parallel lists ordered by descending score.
pub fn parse_zero_shot(value: Value) -> Result<ZeroShotScores, RemoteError> {
    let payload: ZeroShotPayload = serde_json::from_value(value)
        .map_err(|err| RemoteError::Malformed(format!("zero-shot payload: {err}")))?;

    let mut pairs: Vec<(String, f64)> = match payload {
        ZeroShotPayload::Parallel { labels, scores } => labels.into_iter().zip(scores).collect(),
        ZeroShotPayload::PerLabel(items) => items
            .into_iter()
            .map(|item| (item.label, item.score))
            .collect(),
    };

    if pairs.is_empty() {
        return Err(RemoteError::Malformed(
            "zero-shot payload without labels".into(),
        ));
    }

    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let (labels, scores) = pairs.into_iter().unzip();
    Ok(ZeroShotScores { labels, scores })
}

pub fn parse_generation(value: Value) -> Result<String, RemoteError> {
    let payload: GenerationPayload = serde_json::from_value(value)
        .map_err(|err| RemoteError::Malformed(format!("generation payload: {err}")))?;

    match payload {
        GenerationPayload::Single(item) => Ok(item.generated_text),
        GenerationPayload::List(items) => items
            .into_iter()
            .next()
            .map(|item| item.generated_text)
            .ok_or_else(|| RemoteError::Malformed("generation payload is empty".into())),
    }
}

#[derive(Debug, Serialize)]
pub struct ZeroShotRequest<'a> {
    pub inputs: &'a str,
    pub parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
pub struct ZeroShotParameters<'a> {
    pub candidate_labels: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub inputs: &'a str,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub return_full_text: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotPayload {
    Parallel { labels: Vec<String>, scores: Vec<f64> },
    PerLabel(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationPayload {
    List(Vec<GeneratedText>),
    Single(GeneratedText),
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}
