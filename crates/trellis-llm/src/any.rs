#[cfg(feature = "mock")]
use crate::mock::MockEmbedder;

use crate::error::LlmError;
use crate::hash::HashEmbedder;
use crate::provider::EmbeddingProvider;

/// Generates a match over all `AnyEmbedder` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_embedder {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyEmbedder::Hash($p) => $expr,
            #[cfg(feature = "mock")]
            AnyEmbedder::Mock($p) => $expr,
        }
    };
}

/// Enum dispatch over the configured embedding backends.
#[derive(Debug, Clone)]
pub enum AnyEmbedder {
    Hash(HashEmbedder),
    #[cfg(feature = "mock")]
    Mock(MockEmbedder),
}

impl EmbeddingProvider for AnyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        delegate_embedder!(self, |p| p.embed(text).await)
    }

    fn dimensions(&self) -> usize {
        delegate_embedder!(self, |p| p.dimensions())
    }

    fn name(&self) -> &str {
        delegate_embedder!(self, |p| p.name())
    }
}
