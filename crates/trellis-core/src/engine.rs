use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use trellis_hierarchy::{BuilderConfig, HierarchyBuilder, HierarchySummary};
use trellis_index::{CodeIndexer, IndexReport, IndexRequest};
use trellis_llm::{AnyEmbedder, HashEmbedder, RetryingEmbedder};
use trellis_search::{QueryEngine, SearchRequest, SearchResult};
use trellis_store::{RecordKind, SqliteStore, StoreCounts};

use crate::config::{Config, ProviderKind};
use crate::error::{CoreError, Result};

type Embedder = RetryingEmbedder<AnyEmbedder>;

/// Optional search parameters; unset limits fall back to the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub collection_id: Option<String>,
    pub kind: Option<RecordKind>,
    pub limit: Option<usize>,
    pub threshold: Option<f32>,
}

/// Entry point for every operation, bound to one store and one provider.
pub struct Engine {
    store: SqliteStore,
    builder: BuilderConfig,
    indexer: CodeIndexer<Embedder>,
    query: QueryEngine<Embedder>,
    default_limit: usize,
    default_threshold: f32,
    shutdown: Option<watch::Receiver<bool>>,
}

/// Construct the embedding backend selected by `config`.
#[must_use]
pub fn create_embedder(config: &Config) -> AnyEmbedder {
    match config.embedding.provider {
        ProviderKind::Hash => AnyEmbedder::Hash(HashEmbedder::new(config.embedding.dimensions)),
    }
}

impl Engine {
    /// Open the configured store and build the engine on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn open(config: &Config) -> Result<Self> {
        let store = SqliteStore::new(&config.store.sqlite_path, config.embedding.dimensions).await?;
        tracing::info!(
            path = %config.store.sqlite_path,
            dimensions = config.embedding.dimensions,
            provider = ?config.embedding.provider,
            "store opened"
        );
        Ok(Self::from_parts(config, store, create_embedder(config)))
    }

    /// Build on an existing store with an explicit embedding backend.
    ///
    /// The embedder is wrapped with the configured timeout and retries.
    #[must_use]
    pub fn from_parts(config: &Config, store: SqliteStore, embedder: AnyEmbedder) -> Self {
        let embedder = Arc::new(RetryingEmbedder::new(embedder, config.embedding.retry()));
        let indexer = CodeIndexer::new(store.clone(), Arc::clone(&embedder), config.index.indexer());
        let query = QueryEngine::new(store.clone(), embedder, config.search.engine());
        Self {
            store,
            builder: config.index.builder(),
            indexer,
            query,
            default_limit: config.search.default_limit,
            default_threshold: config.search.default_threshold,
            shutdown: None,
        }
    }

    /// Cancel hierarchy builds and indexing passes once `rx` reads `true`.
    #[must_use]
    pub fn with_shutdown(mut self, rx: watch::Receiver<bool>) -> Self {
        self.indexer = self.indexer.with_shutdown(rx.clone());
        self.shutdown = Some(rx);
        self
    }

    #[must_use]
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Walk `root` and summarize its hierarchy without indexing it.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a readable directory or the build is
    /// cancelled.
    pub async fn build_hierarchy(&self, root: &Path) -> Result<HierarchySummary> {
        let mut builder = HierarchyBuilder::new(self.builder.clone());
        if let Some(rx) = &self.shutdown {
            builder = builder.with_shutdown(rx.clone());
        }
        let hierarchy = builder.build(root).await?;
        Ok(hierarchy.summary())
    }

    /// Index a codebase and/or documents into `collection_id`.
    ///
    /// # Errors
    ///
    /// See [`CodeIndexer::index_collection`].
    pub async fn index_collection(
        &self,
        collection_id: &str,
        codebase: Option<PathBuf>,
        docs: Vec<PathBuf>,
    ) -> Result<IndexReport> {
        let report = self
            .indexer
            .index_collection(IndexRequest {
                collection_id: collection_key(collection_id)?.to_string(),
                codebase_path: codebase,
                external_docs: docs,
            })
            .await?;
        Ok(report)
    }

    /// # Errors
    ///
    /// Returns a validation error for a bad query, collection id or cut-off,
    /// or an embedding or store error.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<SearchResult>> {
        let collection_id = match options.collection_id.as_deref() {
            Some(id) => Some(collection_key(id)?.to_string()),
            None => None,
        };
        let request = SearchRequest {
            query: query.to_string(),
            collection_id,
            kind: options.kind,
            limit: options.limit.unwrap_or(self.default_limit),
            threshold: options.threshold.unwrap_or(self.default_threshold),
        };
        Ok(self.query.search(&request).await?)
    }

    /// Remove every record of a collection. Other collections are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a blank id, or a store error.
    pub async fn clear_collection(&self, collection_id: &str) -> Result<StoreCounts> {
        Ok(self.store.clear_collection(collection_key(collection_id)?).await?)
    }

    /// Record counts for one collection, or the whole store.
    ///
    /// # Errors
    ///
    /// Returns an error if the count queries fail.
    pub async fn counts(&self, collection_id: Option<&str>) -> Result<StoreCounts> {
        let collection_id = collection_id.map(collection_key).transpose()?;
        Ok(self.store.counts(collection_id).await?)
    }
}

/// Collection ids are compared trimmed everywhere; blank ids are rejected.
fn collection_key(collection_id: &str) -> Result<&str> {
    let key = collection_id.trim();
    if key.is_empty() {
        return Err(CoreError::Validation("collection id must not be empty".into()));
    }
    Ok(key)
}
