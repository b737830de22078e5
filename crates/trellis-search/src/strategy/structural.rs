use std::collections::BTreeSet;

use trellis_store::StructuralHit;

use super::{Scored, rank};

pub const NAME_WEIGHT: u32 = 10;
pub const PATH_WEIGHT: u32 = 5;
pub const CONTENT_WEIGHT: u32 = 3;
pub const MAX_SCORE: u32 = NAME_WEIGHT + PATH_WEIGHT + CONTENT_WEIGHT;

/// Lexical score of one entry against an already lowercased needle, in `[0, 1]`.
///
/// The name is the last segment of the hierarchy path. A path or tag match
/// counts once.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn structural_score(
    needle: &str,
    hierarchy_path: &str,
    tags: &BTreeSet<String>,
    content: &str,
) -> f32 {
    let path = hierarchy_path.to_lowercase();
    let name = path.rsplit('/').next().unwrap_or_default();

    let mut points = 0;
    if name.contains(needle) {
        points += NAME_WEIGHT;
    }
    if path.contains(needle) || tags.iter().any(|t| t.to_lowercase().contains(needle)) {
        points += PATH_WEIGHT;
    }
    if content.to_lowercase().contains(needle) {
        points += CONTENT_WEIGHT;
    }
    points as f32 / MAX_SCORE as f32
}

/// Score the store's substring hits for `query`, top `keep` kept.
#[must_use]
pub fn score_hits(query: &str, hits: &[StructuralHit], keep: usize) -> Vec<Scored> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let scored = hits
        .iter()
        .filter_map(|hit| {
            let score = structural_score(
                &needle,
                &hit.record.hierarchy_path,
                &hit.record.tags,
                &hit.content,
            );
            (score > 0.0).then(|| Scored::new(hit.record.id.clone(), score))
        })
        .collect();
    rank(scored, keep)
}
