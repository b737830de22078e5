use trellis_llm::cosine_similarity;
use trellis_store::VectorRecord;

use super::{Scored, rank};

/// Cosine similarity of `query` against every record, top `keep` kept.
///
/// Non-positive similarities are dropped.
#[must_use]
pub fn score_vectors(query: &[f32], records: &[VectorRecord], keep: usize) -> Vec<Scored> {
    let scored = records
        .iter()
        .filter_map(|record| {
            let score = cosine_similarity(query, &record.embedding);
            (score > 0.0).then(|| Scored::new(record.id.clone(), score))
        })
        .collect();
    rank(scored, keep)
}
