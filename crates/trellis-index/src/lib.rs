//! Indexing orchestrator: hierarchy → embed → store → similarity graph.

pub mod document;
pub mod error;
pub mod graph;
pub mod ids;
pub mod indexer;
pub mod tags;

pub use error::{IndexError, Result};
pub use indexer::{CodeIndexer, IndexReport, IndexRequest, IndexerConfig};
