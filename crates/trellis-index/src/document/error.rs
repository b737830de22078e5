#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("cannot parse {format}: {reason}")]
    Parse { format: &'static str, reason: String },

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),
}
