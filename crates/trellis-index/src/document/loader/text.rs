use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentLoader, LoadFuture, checked_path,
};

/// Plain text and markup, loaded verbatim.
pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            let content_type = match ext.as_str() {
                "md" | "markdown" => "text/markdown",
                "rst" => "text/x-rst",
                _ => "text/plain",
            };

            let content = tokio::fs::read_to_string(&path).await?;

            Ok(Document {
                content,
                source: path.display().to_string(),
                content_type,
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown", "rst"]
    }
}
