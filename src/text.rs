//! Text clean-up applied before the statistical classifiers.
//!
//! Courtesy and subject rules read the raw merged content; only the
//! remote/fallback classifier input goes through [`normalize`] and
//! [`strip_stop_words`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+").expect("valid email regex"));
static SEPARATOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-=_]{3,}").expect("valid separator regex"));
static BLANK_LINES_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));
static INLINE_SPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("valid whitespace regex"));
static PUNCTUATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation regex"));

const STOP_WORDS: &[&str] = &[
    "a", "ao", "aos", "aquela", "aquelas", "aquele", "aqueles", "aquilo", "as", "até", "com",
    "como", "da", "das", "de", "dela", "delas", "dele", "deles", "depois", "do", "dos", "e",
    "ela", "elas", "ele", "eles", "em", "entre", "era", "eram", "essa", "essas", "esse", "esses",
    "esta", "estas", "este", "estes", "eu", "foi", "foram", "há", "isso", "isto", "já", "lhe",
    "lhes", "lo", "mas", "me", "mesmo", "meu", "meus", "minha", "minhas", "muito", "na", "nas",
    "não", "nem", "no", "nos", "nós", "nossa", "nossas", "nosso", "nossos", "num", "numa", "o",
    "os", "ou", "para", "pela", "pelas", "pelo", "pelos", "por", "qual", "quando", "que", "quem",
    "são", "se", "sem", "seu", "seus", "só", "sua", "suas", "também", "te", "tem", "tinha", "tu",
    "tua", "tuas", "teu", "teus", "um", "uma", "umas", "uns", "você", "vocês", "vos",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Removes markup, links and addresses, then canonicalises whitespace.
pub fn normalize(text: &str) -> String {
    let text = TAG_REGEX.replace_all(text, "");
    let text = URL_REGEX.replace_all(&text, "");
    let text = EMAIL_REGEX.replace_all(&text, EMAIL_PLACEHOLDER);
    let text = SEPARATOR_REGEX.replace_all(&text, "");
    let text = BLANK_LINES_REGEX.replace_all(&text, "\n\n");
    let text = INLINE_SPACE_REGEX.replace_all(&text, " ");

    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Lossy: lower-cases and drops closed-class words. Line structure is lost.
pub fn strip_stop_words(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| !STOP_WORD_SET.contains(*word))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    PUNCTUATION_REGEX
        .replace_all(&lowered, " ")
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_markup_links_and_addresses() {
        let raw = "<p>Olá,</p> veja https://exemplo.com/x e fale com joao@empresa.com.br";
        assert_eq!(normalize(raw), "Olá, veja e fale com [EMAIL]");
    }

    #[test]
    fn normalize_collapses_separators_and_whitespace() {
        let raw = "  Linha   um\t\tfim  \n-----\n\n\n\n  Linha dois  ";
        assert_eq!(normalize(raw), "Linha um fim\n\nLinha dois");
    }

    #[test]
    fn normalize_limits_blank_lines() {
        assert_eq!(normalize("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn normalize_is_deterministic() {
        let raw = "Prezados,\n\n\n\nsegue <b>anexo</b>.";
        assert_eq!(normalize(raw), normalize(raw));
    }

    #[test]
    fn strip_stop_words_lowercases_and_filters() {
        assert_eq!(
            strip_stop_words("Segue o Contrato e o relatório do pagamento"),
            "segue contrato relatório pagamento"
        );
        assert_eq!(strip_stop_words(""), "");
    }

    #[test]
    fn tokenize_drops_short_tokens_and_punctuation() {
        assert_eq!(
            tokenize("Olá, é o status do pedido #123!"),
            vec!["olá", "status", "pedido", "123"]
        );
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("ação rápida", 3), "açã");
        assert_eq!(excerpt("curto", 50), "curto");
    }
}
