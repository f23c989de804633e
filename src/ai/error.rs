use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HUGGINGFACE_API_KEY is not configured")]
    MissingApiKey,
    /// Model still loading or overloaded; the one failure worth retrying.
    #[error("model {model} is temporarily unavailable")]
    Unavailable { model: String },
    #[error("model {model} answered with status {status}")]
    Status { model: String, status: u16 },
    #[error("request to model {model} timed out")]
    Timeout { model: String },
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed model response: {0}")]
    Malformed(String),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Unavailable { .. })
    }
}
