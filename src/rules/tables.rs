//! Phrase and keyword tables shared by every rule stage.
//!
//! Tables are built once at startup and handed to the classifiers behind an
//! `Arc`. All matching is plain substring matching on lower-cased text.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("failed to build phrase matcher for {table}: {source}")]
    Build {
        table: &'static str,
        #[source]
        source: aho_corasick::BuildError,
    },
}

/// A fixed list of lower-case phrases compiled into one automaton.
#[derive(Debug, Clone)]
pub struct PhraseSet {
    phrases: Vec<&'static str>,
    automaton: AhoCorasick,
}

impl PhraseSet {
    pub fn new(table: &'static str, phrases: &[&'static str]) -> Result<Self, RuleTableError> {
        let automaton = AhoCorasick::new(phrases)
            .map_err(|source| RuleTableError::Build { table, source })?;
        Ok(Self {
            phrases: phrases.to_vec(),
            automaton,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.automaton.is_match(text)
    }

    /// The first phrase found in `text`, for logging.
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        self.automaton
            .find(text)
            .map(|m| self.phrases[m.pattern().as_usize()])
    }

    /// Number of distinct phrases present, overlapping entries included.
    pub fn count_distinct(&self, text: &str) -> usize {
        self.automaton
            .find_overlapping_iter(text)
            .map(|m| m.pattern())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }
}

/// An anchor phrase that only counts together with one of its companions,
/// e.g. "parabéns" with "aniversário".
#[derive(Debug, Clone)]
pub struct CoOccurrence {
    pub anchor: PhraseSet,
    pub companions: PhraseSet,
}

impl CoOccurrence {
    pub fn matches(&self, text: &str) -> bool {
        self.anchor.matches(text) && self.companions.matches(text)
    }
}

#[derive(Debug, Clone)]
pub struct RuleTables {
    /// Interrogatives and request verbs treated as a live question.
    pub question_markers: PhraseSet,
    /// Wider marker list used by the local classifier.
    pub fallback_question_markers: PhraseSet,
    /// Seasonal and well-wishing openers.
    pub greeting_phrases: PhraseSet,
    pub productive_keywords: PhraseSet,
    pub unproductive_keywords: PhraseSet,
    /// "gostaria" / "gostaríamos de" read as a request unless they wish or thank.
    pub soft_request: PhraseSet,
    pub soft_request_exemptions: PhraseSet,
    /// Requests for information, timing or delivery. Always actionable.
    pub forward_requests: PhraseSet,
    pub new_questions: PhraseSet,
    pub past_references: PhraseSet,
    pub domain_inquiries: PhraseSet,
    pub courtesy_phrases: PhraseSet,
    pub congratulations: CoOccurrence,
    pub well_wishing: CoOccurrence,
    /// Explicit request verb forms that turn a courtesy opener into preamble.
    pub action_verbs: PhraseSet,
    pub subject_inquiries: PhraseSet,
}

impl RuleTables {
    pub fn portuguese() -> Result<Self, RuleTableError> {
        Ok(Self {
            question_markers: PhraseSet::new("question_markers", QUESTION_MARKERS)?,
            fallback_question_markers: PhraseSet::new(
                "fallback_question_markers",
                FALLBACK_QUESTION_MARKERS,
            )?,
            greeting_phrases: PhraseSet::new("greeting_phrases", GREETING_PHRASES)?,
            productive_keywords: PhraseSet::new("productive_keywords", PRODUCTIVE_KEYWORDS)?,
            unproductive_keywords: PhraseSet::new("unproductive_keywords", UNPRODUCTIVE_KEYWORDS)?,
            soft_request: PhraseSet::new("soft_request", &["gostaria", "gostaríamos de"])?,
            soft_request_exemptions: PhraseSet::new(
                "soft_request_exemptions",
                &["desejar", "agradecer"],
            )?,
            forward_requests: PhraseSet::new("forward_requests", FORWARD_REQUESTS)?,
            new_questions: PhraseSet::new("new_questions", NEW_QUESTIONS)?,
            past_references: PhraseSet::new("past_references", PAST_REFERENCES)?,
            domain_inquiries: PhraseSet::new("domain_inquiries", DOMAIN_INQUIRIES)?,
            courtesy_phrases: PhraseSet::new("courtesy_phrases", COURTESY_PHRASES)?,
            congratulations: CoOccurrence {
                anchor: PhraseSet::new("congratulations", &["parabéns"])?,
                companions: PhraseSet::new("congratulations_companions", &["aniversário"])?,
            },
            well_wishing: CoOccurrence {
                anchor: PhraseSet::new("well_wishing", &["votos de"])?,
                companions: PhraseSet::new(
                    "well_wishing_companions",
                    &["feliz", "ótimo", "sucesso"],
                )?,
            },
            action_verbs: PhraseSet::new("action_verbs", ACTION_VERBS)?,
            subject_inquiries: PhraseSet::new("subject_inquiries", SUBJECT_INQUIRIES)?,
        })
    }

    fn soft_request_in(&self, text: &str) -> bool {
        self.soft_request.matches(text) && !self.soft_request_exemptions.matches(text)
    }

    pub fn has_question(&self, text_lower: &str) -> bool {
        self.question_markers.matches(text_lower) || self.soft_request_in(text_lower)
    }

    pub fn fallback_has_question(&self, text_lower: &str) -> bool {
        self.fallback_question_markers.matches(text_lower) || self.soft_request_in(text_lower)
    }

    pub fn is_clear_greeting(&self, text_lower: &str) -> bool {
        self.greeting_phrases.matches(text_lower)
    }

    /// Action negation applied after a courtesy phrase matched.
    pub fn has_action_verb(&self, text_lower: &str) -> bool {
        self.action_verbs.matches(text_lower) || self.soft_request_in(text_lower)
    }
}

// Unanchored on purpose: "onde" also fires inside "responder", "qual" inside "qualidade".
const QUESTION_MARKERS: &[&str] = &[
    "?", "como", "quando", "onde", "por que", "porque", "qual", "quais", "quanto", "poderiam",
    "podem", "preciso", "quero", "queria", "informar", "informação", "dúvida", "pergunta",
    "status", "como anda", "como está", "como vai", "o que",
];

const FALLBACK_QUESTION_MARKERS: &[&str] = &[
    "?", "poderiam", "podem", "preciso", "quero", "queria", "informar", "informação", "dúvida",
    "pergunta", "como", "quando", "onde", "qual", "quais", "quanto", "como anda", "como está",
    "como vai", "o que", "status", "atualização", "andamento",
];

const GREETING_PHRASES: &[&str] = &[
    "feliz natal",
    "feliz ano novo",
    "boas festas",
    "próspero ano novo",
    "gostaria de desejar",
    "aproveitar para desejar",
    "aproveitar este momento para desejar",
];

const PRODUCTIVE_KEYWORDS: &[&str] = &[
    "solicitação", "requisição", "status", "problema", "erro", "urgente", "suporte", "dúvida",
    "ajuda", "atualização", "pendente", "prazo", "vencimento", "pagamento", "cobrança",
    "contrato", "documento", "relatório", "análise", "verificar", "confirmar", "aprovar",
    "poderiam", "podem", "informar", "informação", "informações", "gostaria", "gostaríamos",
    "preciso", "precisamos", "quero", "queria", "queria saber", "quando", "como", "qual",
    "quais", "quanto", "quanto tempo", "onde", "por que", "porque", "enviar", "enviar o",
    "enviar os", "encaminhar", "fornecer", "disponibilizar", "disponível", "rentabilidade",
    "liquidez", "aporte", "investimento", "fundo", "carteira", "diversificar", "pergunta",
    "perguntas", "questionamento", "consulta", "protocolo", "ticket", "chamado", "pedido",
    "solicitar",
];

const UNPRODUCTIVE_KEYWORDS: &[&str] = &[
    "feliz natal", "boas festas", "feliz ano novo", "próspero ano novo", "parabéns",
    "aniversário", "obrigado", "agradecimento", "agradeço", "bom dia", "boa tarde", "boa noite",
    "felicitações", "votos", "abraços", "saudações", "happy", "merry", "apenas para desejar",
    "passando para desejar", "passando para agradecer", "só para agradecer", "só para desejar",
    "apenas para agradecer", "gostaria de desejar", "aproveitar para desejar", "sem mais",
    "até logo", "tchau",
];

const FORWARD_REQUESTS: &[&str] = &[
    "poderiam",
    "podem enviar",
    "podem informar",
    "gostaria de saber",
    "gostaria de receber",
    "gostaria de confirmar",
    "quando poderiam",
    "quando será",
    "quando vou receber",
    "qual o prazo",
    "qual a data",
    "qual o status",
    "status da",
    "status do",
    "andamento",
    "aguardo retorno",
    "aguardo resposta",
    "aguardo o envio",
    "por favor envie",
    "por favor enviar",
    "favor enviar",
    "preciso receber",
    "precisamos receber",
    "urgente",
    "confirmar",
];

const NEW_QUESTIONS: &[&str] = &[
    "tenho uma dúvida",
    "tenho uma pergunta",
    "tenho dúvidas",
    "minha dúvida",
    "minha pergunta",
    "dúvida sobre",
    "pergunta sobre",
    "uma questão sobre",
    "tirar uma dúvida",
];

const PAST_REFERENCES: &[&str] = &[
    "dúvidas foram respondidas",
    "dúvidas foram esclarecidas",
    "dúvida foi respondida",
    "dúvida foi esclarecida",
    "perguntas foram respondidas",
    "esclareceram minhas dúvidas",
    "ajudaram com minhas dúvidas",
    "ajuda com minhas dúvidas",
    "por responder minhas",
    "por esclarecer",
];

const DOMAIN_INQUIRIES: &[&str] = &[
    "rentabilidade do",
    "rentabilidade da",
    "liquidez do",
    "liquidez da",
    "sobre o aporte",
    "fazer um aporte",
    "novo aporte",
    "informações sobre o fundo",
    "informações do fundo",
    "diversificar a carteira",
    "diversificar minha carteira",
    "diversificação da carteira",
];

const COURTESY_PHRASES: &[&str] = &[
    "feliz natal",
    "boas festas",
    "feliz ano novo",
    "próspero ano novo",
    "apenas para desejar",
    "passando para desejar",
    "passando para agradecer",
    "só para agradecer",
    "só para desejar",
    "apenas para agradecer",
];

const ACTION_VERBS: &[&str] = &[
    "solicito",
    "solicitamos",
    "preciso que",
    "precisamos que",
    "quando poderiam",
    "podem enviar",
    "por favor envie",
    "por favor enviar",
    "urgente",
    "confirmar",
    "preciso receber",
    "precisamos receber",
    "dúvida sobre",
    "pergunta sobre",
    "como faço",
    "qual o prazo",
    "qual a data",
    "enviar o",
    "enviar os",
    "encaminhar o",
    "encaminhar os",
];

const SUBJECT_INQUIRIES: &[&str] = &[
    "dúvida",
    "duvida",
    "pergunta",
    "solicitação",
    "solicitacao",
    "pedido",
    "informação",
    "informações",
    "informacao",
    "consulta",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> RuleTables {
        RuleTables::portuguese().expect("tables build")
    }

    #[test]
    fn count_distinct_includes_overlapping_entries() {
        let set = PhraseSet::new("t", &["enviar", "enviar o", "contrato"]).unwrap();
        assert_eq!(set.count_distinct("enviar o contrato e enviar o recibo"), 3);
        assert_eq!(set.count_distinct("nada"), 0);
    }

    #[test]
    fn first_match_reports_phrase() {
        let set = PhraseSet::new("t", &["urgente", "confirmar"]).unwrap();
        assert_eq!(set.first_match("pode confirmar?"), Some("confirmar"));
        assert_eq!(set.first_match("olá"), None);
    }

    #[test]
    fn soft_request_is_exempt_when_wishing() {
        let tables = tables();
        assert!(tables.has_question("gostaria do relatório"));
        assert!(!tables.has_question("gostaria de desejar boas festas"));
        assert!(!tables.has_action_verb("gostaria de agradecer a parceria"));
    }

    #[test]
    fn plural_soft_request_counts_as_action() {
        let tables = tables();
        assert!(tables.has_action_verb("gostaríamos de agendar uma reunião"));
        assert!(!tables.has_action_verb("gostaríamos de desejar boas festas"));
    }

    #[test]
    fn fallback_markers_are_wider() {
        let tables = tables();
        assert!(tables.fallback_has_question("andamento processo"));
        assert!(!tables.has_question("andamento processo"));
    }

    #[test]
    fn co_occurrence_needs_both_parts() {
        let tables = tables();
        assert!(tables.congratulations.matches("parabéns pelo aniversário"));
        assert!(!tables.congratulations.matches("parabéns pela promoção"));
        assert!(tables.well_wishing.matches("votos de muito sucesso"));
    }

    #[test]
    fn tables_are_populated() {
        let tables = tables();
        assert_eq!(tables.forward_requests.len(), 25);
        assert!(tables.productive_keywords.len() > tables.unproductive_keywords.len());
    }
}
