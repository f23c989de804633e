use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    ai::{GenerationOptions, TextGenerationBackend},
    domain::Category,
    text::excerpt,
};

use super::{templates::template_for, ReplyWriter};

const ECHO_PREFIXES: &[&str] = &["Resposta:", "Email:", "Mensagem:"];

/// Replies drafted by a text generator. No retry: any failure or an empty
/// draft yields the canned template.
pub struct GeneratedReplies {
    backend: Arc<dyn TextGenerationBackend>,
    options: GenerationOptions,
    excerpt_chars: usize,
}

impl GeneratedReplies {
    pub fn new(
        backend: Arc<dyn TextGenerationBackend>,
        options: GenerationOptions,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            backend,
            options,
            excerpt_chars,
        }
    }
}

pub fn build_prompt(content: &str, category: Category, excerpt_chars: usize) -> String {
    let quoted = excerpt(content, excerpt_chars);
    match category {
        Category::Actionable => format!(
            "<s>[INST] Você é um assistente profissional de uma empresa financeira.
Gere uma resposta formal e profissional em português para o seguinte email que requer ação:

Email: {quoted}

A resposta deve:
- Ser cordial e profissional
- Confirmar o recebimento
- Indicar que a solicitação será tratada
- Ter no máximo 3 parágrafos
[/INST]"
        ),
        Category::CourtesyOnly => format!(
            "<s>[INST] Você é um assistente profissional de uma empresa financeira.
Gere uma resposta curta e cordial em português para o seguinte email de cortesia:

Email: {quoted}

A resposta deve:
- Ser breve e educada
- Agradecer a mensagem
- Ter no máximo 2 parágrafos
[/INST]"
        ),
    }
}

/// Drops label echoes such as "Resposta:" the model tends to prepend.
pub fn clean_reply(raw: &str) -> String {
    let mut text = raw.trim();
    while let Some(rest) = ECHO_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(*prefix))
    {
        text = rest.trim();
    }
    text.to_string()
}

#[async_trait]
impl ReplyWriter for GeneratedReplies {
    fn name(&self) -> &'static str {
        "generated"
    }

    async fn reply_for(&self, content: &str, category: Category) -> String {
        let prompt = build_prompt(content, category, self.excerpt_chars);
        match self.backend.generate(&prompt, self.options).await {
            Ok(raw) => {
                let reply = clean_reply(&raw);
                if reply.is_empty() {
                    tracing::warn!(target: "reply", %category, "generator returned an empty draft");
                    template_for(category).to_string()
                } else {
                    reply
                }
            }
            Err(err) => {
                tracing::warn!(
                    target: "reply",
                    error = %err,
                    %category,
                    "reply generation failed, using template"
                );
                template_for(category).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Mutex;

    use crate::ai::RemoteError;

    use super::*;

    struct CannedGenerator {
        answer: Mutex<Option<Result<String, RemoteError>>>,
        last_prompt: Mutex<String>,
        calls: AtomicUsize,
    }

    impl CannedGenerator {
        fn new(answer: Result<String, RemoteError>) -> Arc<Self> {
            Arc::new(Self {
                answer: Mutex::new(Some(answer)),
                last_prompt: Mutex::new(String::new()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerationBackend for CannedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _options: GenerationOptions,
        ) -> Result<String, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().await = prompt.to_string();
            self.answer
                .lock()
                .await
                .take()
                .unwrap_or_else(|| Err(RemoteError::Malformed("no answer left".into())))
        }
    }

    fn writer(backend: Arc<CannedGenerator>) -> GeneratedReplies {
        let options = GenerationOptions {
            max_new_tokens: 300,
            temperature: 0.7,
        };
        GeneratedReplies::new(backend, options, 500)
    }

    #[test]
    fn clean_reply_strips_echo_prefixes() {
        assert_eq!(clean_reply("  Resposta: Olá, tudo bem."), "Olá, tudo bem.");
        assert_eq!(clean_reply("Email:\nMensagem: Prezado"), "Prezado");
        assert_eq!(clean_reply("Sem prefixo"), "Sem prefixo");
    }

    #[test]
    fn prompt_truncates_quoted_content() {
        let content = "x".repeat(2_000);
        let prompt = build_prompt(&content, Category::Actionable, 500);
        assert!(prompt.contains(&"x".repeat(500)));
        assert!(!prompt.contains(&"x".repeat(501)));
        assert!(prompt.contains("3 parágrafos"));
        assert!(build_prompt("oi", Category::CourtesyOnly, 500).contains("2 parágrafos"));
    }

    #[tokio::test]
    async fn generated_reply_has_no_echo() {
        let backend = CannedGenerator::new(Ok("Resposta: Agradecemos o contato.".into()));
        let reply = writer(backend.clone())
            .reply_for("Olá", Category::Actionable)
            .await;
        assert_eq!(reply, "Agradecemos o contato.");
        assert!(!reply.contains("Resposta:"));
        assert!(backend.last_prompt.lock().await.contains("Email: Olá"));
    }

    #[tokio::test]
    async fn failure_uses_template_without_retry() {
        let backend = CannedGenerator::new(Err(RemoteError::Unavailable {
            model: "writer".into(),
        }));
        let reply = writer(backend.clone())
            .reply_for("Olá", Category::CourtesyOnly)
            .await;
        assert_eq!(reply, template_for(Category::CourtesyOnly));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_draft_uses_template() {
        let backend = CannedGenerator::new(Ok("  Resposta:   ".into()));
        let reply = writer(backend).reply_for("Olá", Category::Actionable).await;
        assert_eq!(reply, template_for(Category::Actionable));
    }
}
