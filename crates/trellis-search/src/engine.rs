use std::collections::HashMap;
use std::sync::Arc;

use trellis_llm::{EmbeddingProvider, LlmError};
use trellis_store::{SqliteStore, VectorRecord};

use crate::error::Result;
use crate::fusion::{FusionWeights, fuse, select};
use crate::request::{SearchRequest, SearchResult, Strategy};
use crate::strategy::graph::{self, GraphParams};
use crate::strategy::{Scored, structural, vector};

#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub weights: FusionWeights,
    pub graph: GraphParams,
}

/// Stateless hybrid retriever over one store.
///
/// The provider must be the one the collection was indexed with, otherwise
/// query vectors are not comparable to stored ones.
pub struct QueryEngine<P> {
    store: SqliteStore,
    provider: Arc<P>,
    config: SearchConfig,
}

impl<P: EmbeddingProvider> QueryEngine<P> {
    #[must_use]
    pub fn new(store: SqliteStore, provider: Arc<P>, config: SearchConfig) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    /// Run vector, structural, and graph retrieval and fuse the results.
    ///
    /// Each strategy keeps its top `2 × limit` candidates. Threshold and limit
    /// apply after fusion. No match is `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Validation`] for a bad request before any
    /// I/O, or an embedding or store error.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        request.validate()?;
        let keep = request.limit.saturating_mul(2);
        let collection = request.collection_id.as_deref();

        let query_vector = self.provider.embed(&request.query).await?;
        if query_vector.len() != self.store.dimensions() {
            return Err(LlmError::Dimension {
                expected: self.store.dimensions(),
                actual: query_vector.len(),
            }
            .into());
        }

        let records = self.store.vectors(collection, request.kind).await?;
        let vector_hits = vector::score_vectors(&query_vector, &records, keep);

        let matches = self
            .store
            .structural_matches(collection, request.kind, &request.query)
            .await?;
        let structural_hits = structural::score_hits(&request.query, &matches, keep);

        let seeds: Vec<Scored> = vector_hits
            .iter()
            .chain(&structural_hits)
            .cloned()
            .collect();
        let mut graph_hits = graph::expand(&self.store, &seeds, self.config.graph).await?;

        // Everything passing the filters is in `records`; neighbors outside
        // them belong to another kind or collection.
        let mut by_id: HashMap<String, VectorRecord> =
            records.into_iter().map(|r| (r.id.clone(), r)).collect();
        graph_hits.retain(|hit| by_id.contains_key(&hit.id));
        graph_hits.truncate(keep);

        let fused = fuse(
            self.config.weights,
            &[
                (Strategy::Vector, &vector_hits[..]),
                (Strategy::Structural, &structural_hits[..]),
                (Strategy::Graph, &graph_hits[..]),
            ],
        );
        let candidates = fused.len();
        let selected = select(fused, request.threshold, request.limit);

        tracing::debug!(
            query = %request.query,
            collection = collection.unwrap_or("*"),
            vector = vector_hits.len(),
            structural = structural_hits.len(),
            graph = graph_hits.len(),
            candidates,
            returned = selected.len(),
            "search complete"
        );

        Ok(selected
            .into_iter()
            .filter_map(|fused| {
                let record = by_id.remove(&fused.id)?;
                Some(SearchResult {
                    id: fused.id,
                    kind: record.kind,
                    content: record.content,
                    score: fused.score,
                    metadata: record.metadata,
                    relevance: fused.relevance,
                })
            })
            .collect())
    }
}
