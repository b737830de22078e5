#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index request: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hierarchy error: {0}")]
    Hierarchy(#[from] trellis_hierarchy::HierarchyError),

    #[error("store error: {0}")]
    Store(#[from] trellis_store::StoreError),

    #[error("embedding error: {0}")]
    Llm(#[from] trellis_llm::LlmError),

    #[error("indexing cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, IndexError>;
