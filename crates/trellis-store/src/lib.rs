//! `SQLite` persistence for the three record families: vectors, structural
//! index entries, and similarity graph edges.

pub mod error;
pub mod sqlite;
pub mod types;

pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;
pub use types::{
    EdgeInsert, GraphEdge, RecordKind, RecordMetadata, StoreCounts, StructuralHit,
    StructuralInsert, StructuralRecord, VectorInsert, VectorRecord,
};
