use std::time::Duration;

use serde::{Deserialize, Serialize};
use trellis_hierarchy::BuilderConfig;
use trellis_index::IndexerConfig;
use trellis_llm::RetryConfig;
use trellis_search::{FusionWeights, GraphParams};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Database file, or `:memory:` for a throwaway store.
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> String {
    "data/trellis.db".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Hash,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            dimensions: default_dimensions(),
            timeout_secs: default_embedding_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl EmbeddingConfig {
    #[must_use]
    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..RetryConfig::default()
        }
    }
}

fn default_dimensions() -> usize {
    trellis_llm::hash::DEFAULT_DIMENSIONS
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_max_document_size")]
    pub max_document_size: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            max_content_bytes: default_max_content_bytes(),
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: default_max_file_size(),
            max_document_size: default_max_document_size(),
        }
    }
}

impl IndexConfig {
    #[must_use]
    pub fn builder(&self) -> BuilderConfig {
        BuilderConfig {
            respect_gitignore: self.respect_gitignore,
            include_hidden: self.include_hidden,
            max_file_size: self.max_file_size,
        }
    }

    #[must_use]
    pub fn indexer(&self) -> IndexerConfig {
        IndexerConfig {
            similarity_threshold: self.similarity_threshold,
            max_content_bytes: self.max_content_bytes,
            max_document_size: self.max_document_size,
            builder: self.builder(),
        }
    }
}

fn default_similarity_threshold() -> f32 {
    trellis_index::indexer::DEFAULT_SIMILARITY_THRESHOLD
}

fn default_max_content_bytes() -> usize {
    trellis_index::indexer::DEFAULT_MAX_CONTENT_BYTES
}

fn default_true() -> bool {
    true
}

fn default_max_file_size() -> u64 {
    BuilderConfig::default().max_file_size
}

fn default_max_document_size() -> u64 {
    trellis_index::document::DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,
    #[serde(default = "default_structural_weight")]
    pub structural_weight: f32,
    #[serde(default = "default_graph_weight")]
    pub graph_weight: f32,
    #[serde(default = "default_graph_depth")]
    pub graph_depth: usize,
    #[serde(default = "default_graph_fanout")]
    pub graph_fanout: usize,
    #[serde(default = "default_graph_propagation")]
    pub graph_propagation: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_threshold: default_threshold(),
            vector_weight: default_vector_weight(),
            structural_weight: default_structural_weight(),
            graph_weight: default_graph_weight(),
            graph_depth: default_graph_depth(),
            graph_fanout: default_graph_fanout(),
            graph_propagation: default_graph_propagation(),
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn engine(&self) -> trellis_search::SearchConfig {
        trellis_search::SearchConfig {
            weights: FusionWeights {
                vector: self.vector_weight,
                structural: self.structural_weight,
                graph: self.graph_weight,
            },
            graph: GraphParams {
                depth: self.graph_depth,
                fanout: self.graph_fanout,
                propagation: self.graph_propagation,
            },
        }
    }
}

fn default_limit() -> usize {
    trellis_search::request::DEFAULT_LIMIT
}

fn default_threshold() -> f32 {
    trellis_search::request::DEFAULT_THRESHOLD
}

fn default_vector_weight() -> f32 {
    trellis_search::fusion::DEFAULT_VECTOR_WEIGHT
}

fn default_structural_weight() -> f32 {
    trellis_search::fusion::DEFAULT_STRUCTURAL_WEIGHT
}

fn default_graph_weight() -> f32 {
    trellis_search::fusion::DEFAULT_GRAPH_WEIGHT
}

fn default_graph_depth() -> usize {
    trellis_search::strategy::graph::DEFAULT_DEPTH
}

fn default_graph_fanout() -> usize {
    trellis_search::strategy::graph::DEFAULT_FANOUT
}

fn default_graph_propagation() -> f32 {
    trellis_search::strategy::graph::DEFAULT_PROPAGATION
}
