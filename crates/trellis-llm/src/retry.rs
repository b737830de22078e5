use std::time::Duration;

use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

const BASE_BACKOFF_MS: u64 = 250;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Upper bound for a single `embed` call.
    pub timeout: Duration,
    /// Additional attempts after the first one fails.
    pub max_retries: u32,
    /// First backoff delay; doubles with every attempt.
    pub base_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_backoff: Duration::from_millis(BASE_BACKOFF_MS),
        }
    }
}

/// Wraps a provider with a per-call timeout and exponential backoff retries.
///
/// A returned vector whose length differs from `dimensions()` is rejected
/// immediately and not retried.
#[derive(Debug, Clone)]
pub struct RetryingEmbedder<P> {
    inner: P,
    config: RetryConfig,
}

impl<P: EmbeddingProvider> RetryingEmbedder<P> {
    #[must_use]
    pub fn new(inner: P, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    #[must_use]
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

pub(crate) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
}

impl<P: EmbeddingProvider> EmbeddingProvider for RetryingEmbedder<P> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            match tokio::time::timeout(self.config.timeout, self.inner.embed(text)).await {
                Ok(Ok(vector)) => {
                    let expected = self.inner.dimensions();
                    if vector.len() != expected {
                        return Err(LlmError::Dimension {
                            expected,
                            actual: vector.len(),
                        });
                    }
                    return Ok(vector);
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = LlmError::Timeout(self.config.timeout).to_string(),
            }

            if attempt < self.config.max_retries {
                let delay = backoff_delay(self.config.base_backoff, attempt);
                tracing::warn!(
                    provider = self.inner.name(),
                    attempt = attempt + 1,
                    max_retries = self.config.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "embedding failed, retrying: {last_error}"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.config.max_retries + 1,
            last: last_error,
        })
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
