use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("embedding timed out after {0:?}")]
    Timeout(Duration),

    #[error("embedding failed after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: String },

    #[error("provider unavailable")]
    Unavailable,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
