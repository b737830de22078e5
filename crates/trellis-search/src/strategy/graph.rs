use std::collections::HashMap;

use trellis_store::SqliteStore;

use super::{Scored, rank};
use crate::error::Result;

pub const DEFAULT_DEPTH: usize = 2;
pub const DEFAULT_FANOUT: usize = 5;
pub const DEFAULT_PROPAGATION: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphParams {
    /// Number of hops taken from the seeds.
    pub depth: usize,
    /// Strongest edges followed per node per hop.
    pub fanout: usize,
    /// Multiplier applied on every hop.
    pub propagation: f32,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            fanout: DEFAULT_FANOUT,
            propagation: DEFAULT_PROPAGATION,
        }
    }
}

/// Breadth-first expansion over the similarity graph.
///
/// A neighbor scores `parent × weight × propagation`; each record keeps the
/// best score it reaches by any route. Only nodes whose score improved are
/// expanded on the next hop, so the walk terminates on cyclic graphs.
///
/// # Errors
///
/// Returns an error if an edge lookup fails.
pub async fn expand(
    store: &SqliteStore,
    seeds: &[Scored],
    params: GraphParams,
) -> Result<Vec<Scored>> {
    let mut best: HashMap<String, f32> = HashMap::new();
    let mut frontier = dedup_max(seeds.iter().filter(|s| s.score > 0.0).cloned());

    for hop in 0..params.depth {
        if frontier.is_empty() || params.fanout == 0 {
            break;
        }
        let ids: Vec<String> = frontier.iter().map(|s| s.id.clone()).collect();
        let edges = store.edges_from(&ids, None).await?;

        let mut reached = Vec::new();
        for parent in &frontier {
            // Edges arrive strongest first.
            let neighbors = edges
                .iter()
                .filter_map(|e| e.other(&parent.id).map(|n| (n, e.weight)))
                .filter(|(n, _)| *n != parent.id)
                .take(params.fanout);
            for (neighbor, weight) in neighbors {
                let score = parent.score * weight * params.propagation;
                if score <= 0.0 {
                    continue;
                }
                let entry = best.entry(neighbor.to_string()).or_insert(0.0);
                if score > *entry {
                    *entry = score;
                    reached.push(Scored::new(neighbor, score));
                }
            }
        }
        tracing::trace!(hop, reached = reached.len(), "graph hop");
        frontier = dedup_max(reached.into_iter());
    }

    let scored = best
        .into_iter()
        .map(|(id, score)| Scored { id, score })
        .collect();
    Ok(rank(scored, usize::MAX))
}

fn dedup_max(items: impl Iterator<Item = Scored>) -> Vec<Scored> {
    let mut map: HashMap<String, f32> = HashMap::new();
    for item in items {
        let entry = map.entry(item.id).or_insert(item.score);
        *entry = entry.max(item.score);
    }
    let scored = map
        .into_iter()
        .map(|(id, score)| Scored { id, score })
        .collect();
    rank(scored, usize::MAX)
}
