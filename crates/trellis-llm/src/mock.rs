//! Test-only mock embedding provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

#[derive(Debug, Clone)]
pub struct MockEmbedder {
    /// Vector returned for every text that has no entry in `fixed`.
    pub embedding: Vec<f32>,
    /// Per-text overrides, matched by exact text.
    pub fixed: Vec<(String, Vec<f32>)>,
    /// Texts containing this marker fail with `LlmError::Unavailable`.
    pub fail_on: Option<String>,
    /// Milliseconds to sleep before returning.
    pub delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            embedding: vec![1.0, 0.0, 0.0, 0.0],
            fixed: Vec::new(),
            fail_on: None,
            delay_ms: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn with_embedding(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fixed(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.fixed.push((text.into(), vector));
        self
    }

    #[must_use]
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_on = Some(marker.into());
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Number of `embed` calls made so far, shared across clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if let Some(marker) = &self.fail_on
            && text.contains(marker.as_str())
        {
            return Err(LlmError::Unavailable);
        }
        Ok(self
            .fixed
            .iter()
            .find(|(t, _)| t == text)
            .map_or_else(|| self.embedding.clone(), |(_, v)| v.clone()))
    }

    fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}
