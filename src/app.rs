use std::sync::Arc;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use futures::{stream, StreamExt};
use reqwest::Client;
use serde_json::json;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::{
    ai::{GenerationOptions, HuggingFaceClient},
    classify::{FallbackClassifier, RemoteClassifier, TextClassifier},
    config::AppConfig,
    domain::Message,
    pipeline::TriagePipeline,
    reply::{GeneratedReplies, ReplyWriter, TemplateReplies},
    rules::RuleTables,
};

const PROCESSING_ERROR: &str = "processing error";

pub struct TriageApp {
    pipeline: Arc<TriagePipeline>,
    concurrency: usize,
}

impl TriageApp {
    pub fn initialize(config: AppConfig) -> Result<Self> {
        let tables = Arc::new(RuleTables::portuguese().context("failed to build rule tables")?);
        tracing::debug!(
            target: "app",
            productive = tables.productive_keywords.len(),
            unproductive = tables.unproductive_keywords.len(),
            forward_requests = tables.forward_requests.len(),
            "rule tables loaded"
        );
        let timezone = parse_timezone(&config.timezone);

        let (classifier, replies) = if config.huggingface.has_credentials() {
            let http_client = Client::builder()
                .user_agent(format!("mail-triage/{}", env!("CARGO_PKG_VERSION")))
                .build()?;
            let hf = Arc::new(HuggingFaceClient::new(
                http_client,
                config.huggingface.clone(),
            ));
            let options = GenerationOptions {
                max_new_tokens: config.pipeline.max_new_tokens,
                temperature: config.pipeline.temperature,
            };
            let classifier: Arc<dyn TextClassifier> = Arc::new(RemoteClassifier::new(
                hf.clone(),
                tables.clone(),
                config.huggingface.retry_delay,
            ));
            let replies: Arc<dyn ReplyWriter> = Arc::new(GeneratedReplies::new(
                hf,
                options,
                config.pipeline.prompt_excerpt_chars,
            ));
            (classifier, replies)
        } else {
            tracing::warn!(
                target: "app",
                "HUGGINGFACE_API_KEY not set; using local classifier and reply templates"
            );
            let classifier: Arc<dyn TextClassifier> =
                Arc::new(FallbackClassifier::new(tables.clone()));
            let replies: Arc<dyn ReplyWriter> = Arc::new(TemplateReplies);
            (classifier, replies)
        };

        tracing::info!(
            target: "app",
            classifier = classifier.name(),
            replies = replies.name(),
            timezone = %timezone,
            "triage pipeline ready"
        );

        Ok(Self {
            pipeline: Arc::new(TriagePipeline::new(tables, classifier, replies, timezone)),
            concurrency: config.pipeline.concurrency.max(1),
        })
    }

    /// Reads one JSON message per stdin line and writes one JSON result per
    /// line to stdout, in input order. Ctrl-C stops intake; messages already
    /// in flight are still answered.
    pub async fn run(self) -> Result<()> {
        let TriageApp {
            pipeline,
            concurrency,
        } = self;

        tracing::info!(target: "app", concurrency, "reading messages from stdin");

        let lines = stream::unfold(BufReader::new(io::stdin()).lines(), |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((line, lines)),
                Ok(None) => None,
                Err(err) => {
                    tracing::error!(target: "app", error = %err, "failed to read stdin");
                    None
                }
            }
        });

        let outputs = lines
            .enumerate()
            .filter(|(_, line)| futures::future::ready(!line.trim().is_empty()))
            .take_until(Box::pin(interrupted()))
            .map(|(idx, line)| {
                let pipeline = pipeline.clone();
                let line_no = idx + 1;
                async move {
                    let handle =
                        tokio::spawn(async move { process_line(&pipeline, line_no, &line).await });
                    match handle.await {
                        Ok(output) => output,
                        Err(err) => {
                            tracing::error!(target: "app", line = line_no, error = %err, "triage task failed");
                            error_line(line_no)
                        }
                    }
                }
            })
            .buffered(concurrency);
        tokio::pin!(outputs);

        let mut stdout = io::stdout();
        let mut processed = 0usize;
        while let Some(output) = outputs.next().await {
            stdout.write_all(output.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
            processed += 1;
        }

        tracing::info!(target: "app", processed, "input exhausted");
        Ok(())
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!(target: "app", "interrupt received; finishing in-flight messages");
        }
        Err(err) => {
            tracing::warn!(target: "app", error = %err, "failed to listen for interrupt");
            futures::future::pending::<()>().await;
        }
    }
}

async fn process_line(pipeline: &TriagePipeline, line_no: usize, line: &str) -> String {
    let message: Message = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(target: "app", line = line_no, error = %err, "invalid message line");
            return error_line(line_no);
        }
    };

    let response = pipeline.classify(&message).await;
    serde_json::to_string(&response).unwrap_or_else(|err| {
        tracing::error!(target: "app", line = line_no, error = %err, "failed to encode response");
        error_line(line_no)
    })
}

fn error_line(line_no: usize) -> String {
    json!({ "line": line_no, "error": PROCESSING_ERROR }).to_string()
}

fn parse_timezone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!(target: "app", timezone = name, "unknown timezone, using default");
        chrono_tz::America::Sao_Paulo
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_pipeline() -> TriagePipeline {
        let tables = Arc::new(RuleTables::portuguese().unwrap());
        TriagePipeline::new(
            tables.clone(),
            Arc::new(FallbackClassifier::new(tables)),
            Arc::new(TemplateReplies),
            chrono_tz::America::Sao_Paulo,
        )
    }

    #[tokio::test]
    async fn process_line_emits_response_json() {
        let line = r#"{"subject":"Pedido 991","content":"Boas festas!"}"#;
        let output = process_line(&local_pipeline(), 1, line).await;
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["category"], "Actionable");
        assert_eq!(value["confidence"], 0.9);
        assert!(value["reply_text"].as_str().is_some_and(|s| !s.is_empty()));
        assert!(value["processed_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn invalid_line_yields_opaque_error() {
        let output = process_line(&local_pipeline(), 7, "not json").await;
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["line"], 7);
        assert_eq!(value["error"], PROCESSING_ERROR);
    }

    #[tokio::test]
    async fn interrupt_future_stays_pending_without_a_signal() {
        let waited = tokio::time::timeout(std::time::Duration::from_millis(50), interrupted()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn timezone_falls_back_to_default() {
        assert_eq!(parse_timezone("Mars/Olympus"), chrono_tz::America::Sao_Paulo);
        assert_eq!(parse_timezone("UTC"), chrono_tz::UTC);
    }
}
