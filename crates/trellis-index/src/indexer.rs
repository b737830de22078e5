//! Collection indexing orchestrator: hierarchy → embed → store → graph.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use trellis_hierarchy::{BuilderConfig, Hierarchy, HierarchyBuilder, HierarchyNode, NodeKind};
use trellis_llm::EmbeddingProvider;
use trellis_store::{
    EdgeInsert, RecordKind, RecordMetadata, SqliteStore, StructuralInsert, VectorInsert,
};

use crate::document::{DEFAULT_MAX_FILE_SIZE, Document, Loaders};
use crate::error::{IndexError, Result};
use crate::graph::{RELATION_SIMILAR, similar_pairs};
use crate::ids::{document_record_id, edge_id, node_record_id};
use crate::tags::{document_tags, node_tags};

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Edges are created for pairs strictly above this cosine similarity.
    pub similarity_threshold: f32,
    /// Stored and embedded content is cut to this many bytes.
    pub max_content_bytes: usize,
    pub max_document_size: u64,
    pub builder: BuilderConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
            max_document_size: DEFAULT_MAX_FILE_SIZE,
            builder: BuilderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexRequest {
    pub collection_id: String,
    pub codebase_path: Option<PathBuf>,
    pub external_docs: Vec<PathBuf>,
}

/// Summary of an indexing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexReport {
    pub collection_id: String,
    pub files: usize,
    pub elements: usize,
    pub documents: usize,
    pub vectors_written: usize,
    pub structural_written: usize,
    pub edges_created: usize,
    pub documents_skipped: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Indexes collections into one store.
///
/// At most one pass runs per collection at a time; a second call for the same
/// collection waits for the first to finish. Different collections proceed
/// concurrently.
pub struct CodeIndexer<P> {
    store: SqliteStore,
    provider: Arc<P>,
    config: IndexerConfig,
    loaders: Loaders,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<P: EmbeddingProvider> CodeIndexer<P> {
    #[must_use]
    pub fn new(store: SqliteStore, provider: Arc<P>, config: IndexerConfig) -> Self {
        let loaders = Loaders::with_max_file_size(config.max_document_size);
        Self {
            store,
            provider,
            config,
            loaders,
            locks: Mutex::new(HashMap::new()),
            shutdown: None,
        }
    }

    /// Abort passes with [`IndexError::Cancelled`] once `rx` reads `true`.
    #[must_use]
    pub fn with_shutdown(mut self, rx: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(rx);
        self
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.shutdown.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Err(IndexError::Cancelled);
        }
        Ok(())
    }

    fn collection_lock(&self, collection_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(locks.entry(collection_id.to_string()).or_default())
    }

    /// Index a codebase and/or external documents into `request.collection_id`,
    /// then rebuild the collection's similarity graph.
    ///
    /// Unreadable files, unsupported documents, and failed embeddings are
    /// logged, counted in the report, and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Validation`] for an empty collection id or a
    /// request with nothing to index, a hierarchy error if the codebase root is
    /// unusable, a store error if a write fails, or [`IndexError::Cancelled`].
    pub async fn index_collection(&self, request: IndexRequest) -> Result<IndexReport> {
        let collection_id = request.collection_id.trim();
        if collection_id.is_empty() {
            return Err(IndexError::Validation("collection id must not be empty".into()));
        }
        if request.codebase_path.is_none() && request.external_docs.is_empty() {
            return Err(IndexError::Validation(
                "nothing to index: give a codebase path or external documents".into(),
            ));
        }

        let lock = self.collection_lock(collection_id);
        let _guard = lock.lock().await;

        let start = std::time::Instant::now();
        let mut report = IndexReport {
            collection_id: collection_id.to_string(),
            ..IndexReport::default()
        };
        tracing::info!(collection = collection_id, "indexing started");

        if let Some(root) = &request.codebase_path {
            self.index_codebase(collection_id, root, &mut report).await?;
        }
        for path in &request.external_docs {
            self.check_cancelled()?;
            self.index_document(collection_id, path, &mut report).await?;
        }

        self.check_cancelled()?;
        report.edges_created = self.rebuild_graph(collection_id).await?;

        report.duration_ms = start.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        tracing::info!(
            collection = collection_id,
            files = report.files,
            elements = report.elements,
            documents = report.documents,
            vectors = report.vectors_written,
            edges = report.edges_created,
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "indexing finished"
        );
        Ok(report)
    }

    async fn index_codebase(
        &self,
        collection_id: &str,
        root: &Path,
        report: &mut IndexReport,
    ) -> Result<()> {
        let mut builder = HierarchyBuilder::new(self.config.builder.clone());
        if let Some(rx) = &self.shutdown {
            builder = builder.with_shutdown(rx.clone());
        }
        let hierarchy = builder.build(root).await.map_err(|e| match e {
            trellis_hierarchy::HierarchyError::Cancelled => IndexError::Cancelled,
            other => other.into(),
        })?;

        let total = hierarchy.len();
        for node in hierarchy.nodes() {
            self.check_cancelled()?;
            let Some(content) = node.indexable_content() else {
                continue;
            };
            match node.kind {
                NodeKind::File => report.files += 1,
                k if k.is_element() => report.elements += 1,
                _ => {}
            }

            let text = truncate_to_boundary(content, self.config.max_content_bytes);
            let embedding = match self.provider.embed(text).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(path = %node.path.display(), node = %node.name, error = %e, "embedding failed, skipping node");
                    report.errors.push(format!("{} ({}): {e}", node.path.display(), node.name));
                    continue;
                }
            };

            self.write_node(collection_id, &hierarchy, node, content, text, &embedding)
                .await?;
            report.vectors_written += 1;
            report.structural_written += 1;
        }

        tracing::debug!(collection = collection_id, nodes = total, "codebase pass done");
        Ok(())
    }

    async fn write_node(
        &self,
        collection_id: &str,
        hierarchy: &Hierarchy,
        node: &HierarchyNode,
        full_content: &str,
        text: &str,
        embedding: &[f32],
    ) -> Result<()> {
        let id = node_record_id(collection_id, node.id.as_str());
        let tags = node_tags(node);
        let hierarchy_path = hierarchy
            .hierarchy_path(&node.id)
            .unwrap_or_else(|| node.name.clone());

        let metadata = RecordMetadata {
            source: "hierarchy".into(),
            path: Some(node.path.display().to_string()),
            node_kind: Some(node.kind.to_string()),
            language: node.metadata.language.clone(),
            line_range: node.metadata.line_range,
            hierarchy_path: Some(hierarchy_path.clone()),
            tags: tags.clone(),
        };

        self.store
            .upsert_vector(&VectorInsert {
                id: &id,
                collection_id,
                kind: RecordKind::Codebase,
                content: text,
                embedding,
                metadata: &metadata,
            })
            .await?;
        self.store
            .upsert_structural(&StructuralInsert {
                id: &id,
                collection_id,
                node_id: node.id.as_str(),
                hierarchy_path: &hierarchy_path,
                tags: &tags,
                content_hash: blake3::hash(full_content.as_bytes()).to_hex().as_str(),
            })
            .await?;
        Ok(())
    }

    async fn index_document(
        &self,
        collection_id: &str,
        path: &Path,
        report: &mut IndexReport,
    ) -> Result<()> {
        let Some(loader) = self.loaders.for_path(path) else {
            tracing::warn!(path = %path.display(), "unsupported document format, skipping");
            report.documents_skipped += 1;
            return Ok(());
        };

        let doc = match loader.load(path).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot load document, skipping");
                report.errors.push(format!("{}: {e}", path.display()));
                return Ok(());
            }
        };
        if doc.content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "empty document, skipping");
            report.documents_skipped += 1;
            return Ok(());
        }

        let text = truncate_to_boundary(&doc.content, self.config.max_content_bytes);
        let embedding = match self.provider.embed(text).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "embedding failed, skipping document");
                report.errors.push(format!("{}: {e}", path.display()));
                return Ok(());
            }
        };

        self.write_document(collection_id, &doc, text, &embedding).await?;
        report.documents += 1;
        report.vectors_written += 1;
        report.structural_written += 1;
        Ok(())
    }

    async fn write_document(
        &self,
        collection_id: &str,
        doc: &Document,
        text: &str,
        embedding: &[f32],
    ) -> Result<()> {
        let id = document_record_id(collection_id, &doc.source);
        let tags = document_tags(&doc.content, doc.content_type);
        let metadata = RecordMetadata {
            source: "document".into(),
            path: Some(doc.source.clone()),
            hierarchy_path: Some(doc.source.trim_start_matches('/').to_string()),
            tags: tags.clone(),
            ..RecordMetadata::default()
        };

        self.store
            .upsert_vector(&VectorInsert {
                id: &id,
                collection_id,
                kind: RecordKind::ExternalDoc,
                content: text,
                embedding,
                metadata: &metadata,
            })
            .await?;
        self.store
            .upsert_structural(&StructuralInsert {
                id: &id,
                collection_id,
                node_id: &doc.source,
                hierarchy_path: doc.source.trim_start_matches('/'),
                tags: &tags,
                content_hash: blake3::hash(doc.content.as_bytes()).to_hex().as_str(),
            })
            .await?;
        Ok(())
    }

    /// Replace the collection's edges with the current similarity pairs.
    async fn rebuild_graph(&self, collection_id: &str) -> Result<usize> {
        let records = self.store.vectors(Some(collection_id), None).await?;
        let embeddings: Vec<&[f32]> = records.iter().map(|r| r.embedding.as_slice()).collect();
        let pairs = similar_pairs(&embeddings, self.config.similarity_threshold);

        let ids: Vec<String> = pairs
            .iter()
            .map(|p| edge_id(collection_id, &records[p.source].id, &records[p.target].id))
            .collect();
        let edges: Vec<EdgeInsert<'_>> = pairs
            .iter()
            .zip(&ids)
            .map(|(p, id)| EdgeInsert {
                id,
                collection_id,
                source_id: &records[p.source].id,
                target_id: &records[p.target].id,
                relation_type: RELATION_SIMILAR,
                weight: p.weight,
            })
            .collect();
        let removed = self.store.replace_edges(collection_id, &edges).await?;

        tracing::debug!(
            collection = collection_id,
            records = records.len(),
            removed,
            created = edges.len(),
            "similarity graph rebuilt"
        );
        Ok(edges.len())
    }
}

/// Longest prefix of `s` no longer than `max` bytes that ends on a char
/// boundary.
#[must_use]
pub fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_to_boundary("abc", 10), "abc");
        assert_eq!(truncate_to_boundary("abc", 3), "abc");
    }

    #[test]
    fn truncate_backs_off_to_char_boundary() {
        let s = "aé"; // 'é' is two bytes
        assert_eq!(truncate_to_boundary(s, 2), "a");
        assert_eq!(truncate_to_boundary(s, 0), "");
    }

    #[test]
    fn report_serializes() {
        let report = IndexReport {
            collection_id: "c".into(),
            files: 1,
            ..IndexReport::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"], 1);
        assert_eq!(json["collection_id"], "c");
    }
}
