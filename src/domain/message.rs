use serde::{Deserialize, Serialize};

/// An inbound message as handed over by the transport layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Message {
    #[cfg(test)]
    pub fn new(subject: Option<&str>, content: Option<&str>) -> Self {
        Self {
            subject: subject.map(str::to_string),
            content: content.map(str::to_string),
        }
    }

    /// Subject text, if present and not blank.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Body prefixed with the subject line, the text every rule stage reads.
    pub fn merged_content(&self) -> String {
        let content = self.content.as_deref().unwrap_or("");
        match self.subject() {
            Some(subject) => format!("Assunto: {subject}\n\n{content}"),
            None => content.to_string(),
        }
    }
}
