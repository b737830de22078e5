//! Configuration and the [`Engine`] facade: one store, one embedding
//! provider, and the hierarchy, indexing, and search operations over them.

pub mod config;
pub mod engine;
pub mod error;

pub use config::Config;
pub use engine::{Engine, SearchOptions, create_embedder};
pub use error::{CoreError, Result};
pub use trellis_hierarchy::HierarchySummary;
pub use trellis_index::IndexReport;
pub use trellis_search::{SearchResult, Strategy};
pub use trellis_store::{RecordKind, StoreCounts};
