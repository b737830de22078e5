#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Hierarchy(#[from] trellis_hierarchy::HierarchyError),

    #[error(transparent)]
    Index(#[from] trellis_index::IndexError),

    #[error(transparent)]
    Search(#[from] trellis_search::SearchError),

    #[error(transparent)]
    Store(#[from] trellis_store::StoreError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
