//! Pairwise similarity edges.
//!
//! Exhaustive O(n²) comparison over one collection. Fine for a project-sized
//! collection; past a few thousand records this wants an approximate
//! nearest-neighbor index instead.

use trellis_llm::cosine_similarity;

pub const RELATION_SIMILAR: &str = "similar";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarPair {
    /// Index of the earlier record.
    pub source: usize,
    pub target: usize,
    pub weight: f32,
}

/// Every unordered pair with cosine similarity strictly above `threshold`,
/// as `(i, j)` with `i < j`. No self-pairs.
#[must_use]
pub fn similar_pairs(embeddings: &[&[f32]], threshold: f32) -> Vec<SimilarPair> {
    let mut pairs = Vec::new();
    for (i, a) in embeddings.iter().enumerate() {
        for (j, b) in embeddings.iter().enumerate().skip(i + 1) {
            let weight = cosine_similarity(a, b);
            if weight > threshold {
                pairs.push(SimilarPair {
                    source: i,
                    target: j,
                    weight,
                });
            }
        }
    }
    pairs
}
