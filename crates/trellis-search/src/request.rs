use std::collections::BTreeSet;

use serde::Serialize;
use trellis_store::{RecordKind, RecordMetadata};

use crate::error::{Result, SearchError};

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// A hybrid search query with its filters and cut-offs.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub collection_id: Option<String>,
    pub kind: Option<RecordKind>,
    pub limit: usize,
    /// Minimum fused score, inclusive.
    pub threshold: f32,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            collection_id: None,
            kind: None,
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(SearchError::Validation("query must not be empty".into()));
        }
        if self.limit == 0 {
            return Err(SearchError::Validation("limit must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SearchError::Validation(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Retrieval strategy that contributed to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Vector,
    Structural,
    Graph,
}

impl Strategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Structural => "structural",
            Self::Graph => "graph",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub kind: RecordKind,
    pub content: String,
    pub score: f32,
    pub metadata: RecordMetadata,
    pub relevance: BTreeSet<Strategy>,
}
