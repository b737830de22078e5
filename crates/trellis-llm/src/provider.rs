use std::future::Future;

use crate::error::LlmError;

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic for a fixed model and version:
/// indexing and querying compare vectors produced at different times, and
/// that comparison is only meaningful if the same text always lands on the
/// same point.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a vector of exactly [`Self::dimensions`] components.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or does not support embeddings.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    /// Dimensionality of every vector this provider returns.
    fn dimensions(&self) -> usize;

    fn name(&self) -> &str;
}
