//! Max-of-weighted-scores fusion across strategies.

use std::collections::{BTreeSet, HashMap};

use crate::request::Strategy;
use crate::strategy::Scored;

pub const DEFAULT_VECTOR_WEIGHT: f32 = 0.4;
pub const DEFAULT_STRUCTURAL_WEIGHT: f32 = 0.3;
pub const DEFAULT_GRAPH_WEIGHT: f32 = 0.3;

/// Relative trust in each strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub vector: f32,
    pub structural: f32,
    pub graph: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector: DEFAULT_VECTOR_WEIGHT,
            structural: DEFAULT_STRUCTURAL_WEIGHT,
            graph: DEFAULT_GRAPH_WEIGHT,
        }
    }
}

impl FusionWeights {
    /// Scale so the largest weight is 1.0, keeping ratios.
    ///
    /// A perfect hit from the most trusted strategy then scores 1.0, which
    /// keeps every threshold in `[0, 1]` reachable. All-zero weights are
    /// returned unchanged.
    #[must_use]
    pub fn normalized(self) -> Self {
        let max = self.vector.max(self.structural).max(self.graph);
        if max <= 0.0 {
            return self;
        }
        Self {
            vector: self.vector / max,
            structural: self.structural / max,
            graph: self.graph / max,
        }
    }

    #[must_use]
    pub fn weight(self, strategy: Strategy) -> f32 {
        match strategy {
            Strategy::Vector => self.vector,
            Strategy::Structural => self.structural,
            Strategy::Graph => self.graph,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fused {
    pub id: String,
    pub score: f32,
    pub relevance: BTreeSet<Strategy>,
}

/// Merge per-strategy lists by id.
///
/// The fused score is the maximum weighted score across strategies, using
/// [`FusionWeights::normalized`] weights. Strategies whose weighted score is
/// zero are not listed in `relevance`. Output is strongest first, ties by id.
#[must_use]
pub fn fuse(weights: FusionWeights, lists: &[(Strategy, &[Scored])]) -> Vec<Fused> {
    let weights = weights.normalized();
    let mut merged: HashMap<&str, Fused> = HashMap::new();

    for (strategy, hits) in lists {
        let weight = weights.weight(*strategy);
        for hit in *hits {
            let weighted = hit.score * weight;
            if weighted <= 0.0 {
                continue;
            }
            let entry = merged.entry(hit.id.as_str()).or_insert_with(|| Fused {
                id: hit.id.clone(),
                score: 0.0,
                relevance: BTreeSet::new(),
            });
            entry.score = entry.score.max(weighted);
            entry.relevance.insert(*strategy);
        }
    }

    let mut fused: Vec<Fused> = merged.into_values().collect();
    fused.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    fused
}

/// Keep results scoring at least `threshold`, then the first `limit`.
///
/// Expects `fused` in the order [`fuse`] returns.
#[must_use]
pub fn select(mut fused: Vec<Fused>, threshold: f32, limit: usize) -> Vec<Fused> {
    fused.retain(|f| f.score >= threshold);
    fused.truncate(limit);
    fused
}
