//! Error types for trellis-hierarchy.

use std::path::PathBuf;

/// Errors that abort a hierarchy build.
///
/// Per-entry failures (unreadable directories, non-UTF-8 files) are logged
/// and skipped instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// The root path is missing, unreadable, or not a directory.
    #[error("cannot read root {path}: {reason}")]
    FileSystem { path: PathBuf, reason: String },

    /// The build was cancelled through its shutdown signal.
    #[error("hierarchy build cancelled")]
    Cancelled,
}

/// Result type alias using `HierarchyError`.
pub type Result<T> = std::result::Result<T, HierarchyError>;
