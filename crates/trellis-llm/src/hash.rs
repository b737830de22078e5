//! Hash-seeded placeholder embeddings.
//!
//! Each text seeds a blake3 extendable output whose bytes are mapped to
//! components in `[-1, 1]` and L2-normalized. Identical texts produce
//! identical vectors (cosine 1.0); distinct texts produce near-orthogonal
//! vectors, so similarity carries no semantic signal beyond exact equality.
//! Replace with a model-backed provider for meaningful vector ranking.

use crate::error::LlmError;
use crate::provider::EmbeddingProvider;

pub const DEFAULT_DIMENSIONS: usize = 1536;
const MODEL_ID: &str = "trellis-hash-v1";

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Synchronous form of [`EmbeddingProvider::embed`].
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(MODEL_ID.as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        let mut reader = hasher.finalize_xof();

        let mut bytes = vec![0u8; self.dimensions * 4];
        reader.fill(&mut bytes);

        let mut vector: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| {
                let n = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                (f64::from(n) / f64::from(u32::MAX)).mul_add(2.0, -1.0) as f32
            })
            .collect();

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if self.dimensions == 0 {
            return Err(LlmError::Dimension {
                expected: 1,
                actual: 0,
            });
        }
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "hash"
    }
}
