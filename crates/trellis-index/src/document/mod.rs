//! External document loading.
//!
//! Each [`DocumentLoader`] turns one file into canonical text. The indexer
//! looks loaders up by extension through [`Loaders`]; files no loader claims
//! are skipped by the caller.

pub mod error;
pub mod loader;

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub use error::DocumentError;
#[cfg(feature = "pdf")]
pub use loader::PdfLoader;
pub use loader::{StructuredLoader, TextLoader};

/// Default maximum document size: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    /// Canonical path of the source file.
    pub source: String,
    pub content_type: &'static str,
}

pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Document, DocumentError>> + Send + 'a>>;

pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> LoadFuture<'_>;

    /// Lowercase extensions this loader claims, without the dot.
    fn supported_extensions(&self) -> &[&str];
}

/// Extension-keyed set of loaders.
pub struct Loaders {
    loaders: Vec<Box<dyn DocumentLoader>>,
}

impl Loaders {
    /// Text, structured, and (with the `pdf` feature) PDF loaders sharing one
    /// size cap.
    #[must_use]
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        #[cfg_attr(not(feature = "pdf"), allow(unused_mut))]
        let mut loaders: Vec<Box<dyn DocumentLoader>> = vec![
            Box::new(TextLoader { max_file_size }),
            Box::new(StructuredLoader { max_file_size }),
        ];
        #[cfg(feature = "pdf")]
        loaders.push(Box::new(PdfLoader { max_file_size }));
        Self { loaders }
    }

    #[must_use]
    pub fn for_path(&self, path: &Path) -> Option<&dyn DocumentLoader> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.loaders
            .iter()
            .find(|l| l.supported_extensions().contains(&ext.as_str()))
            .map(AsRef::as_ref)
    }
}

impl Default for Loaders {
    fn default() -> Self {
        Self::with_max_file_size(DEFAULT_MAX_FILE_SIZE)
    }
}

/// Canonicalize `path` and enforce the size cap.
pub(crate) async fn checked_path(path: &Path, max_size: u64) -> Result<std::path::PathBuf, DocumentError> {
    let path = tokio::fs::canonicalize(path).await?;
    let meta = tokio::fs::metadata(&path).await?;
    if meta.len() > max_size {
        return Err(DocumentError::FileTooLarge(meta.len()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaders_by_extension() {
        let loaders = Loaders::default();
        assert!(loaders.for_path(Path::new("a.md")).is_some());
        assert!(loaders.for_path(Path::new("A.TXT")).is_some());
        assert!(loaders.for_path(Path::new("conf.toml")).is_some());
        assert!(loaders.for_path(Path::new("data.json")).is_some());
        assert!(loaders.for_path(Path::new("image.png")).is_none());
        assert!(loaders.for_path(Path::new("README")).is_none());
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn pdf_unsupported_without_feature() {
        assert!(Loaders::default().for_path(Path::new("paper.pdf")).is_none());
    }
}
