use async_trait::async_trait;

use crate::domain::Category;

use super::ReplyWriter;

const ACTIONABLE_TEMPLATE: &str = "Prezado(a),

Agradecemos o seu contato. Recebemos sua mensagem e ela já foi encaminhada para análise da equipe responsável.

Em breve, um de nossos especialistas entrará em contato com mais informações sobre sua solicitação.

Atenciosamente,
Equipe de Atendimento";

const COURTESY_TEMPLATE: &str = "Prezado(a),

Agradecemos sua gentil mensagem!

Desejamos igualmente tudo de bom para você e sua família.

Cordialmente,
Equipe de Atendimento";

pub fn template_for(category: Category) -> &'static str {
    match category {
        Category::Actionable => ACTIONABLE_TEMPLATE,
        Category::CourtesyOnly => COURTESY_TEMPLATE,
    }
}

/// Canned replies, used when no generator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReplies;

#[async_trait]
impl ReplyWriter for TemplateReplies {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn reply_for(&self, _content: &str, category: Category) -> String {
        template_for(category).to_string()
    }
}
