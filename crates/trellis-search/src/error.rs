/// A failed search. An empty result list is not an error.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search request: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] trellis_store::StoreError),

    #[error("query embedding failed: {0}")]
    Llm(#[from] trellis_llm::LlmError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
