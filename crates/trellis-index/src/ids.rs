//! Deterministic record ids.
//!
//! Re-indexing unchanged inputs must hit the same primary keys so that
//! insert-or-replace overwrites instead of duplicating.

use uuid::Uuid;

fn v5(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

/// Vector and structural record id for a hierarchy node.
#[must_use]
pub fn node_record_id(collection_id: &str, node_id: &str) -> String {
    v5(&format!("trellis:node:{collection_id}:{node_id}"))
}

/// Vector record id for an external document, keyed by canonical path.
#[must_use]
pub fn document_record_id(collection_id: &str, source: &str) -> String {
    v5(&format!("trellis:doc:{collection_id}:{source}"))
}

/// Edge id for an ordered `(source, target)` pair.
#[must_use]
pub fn edge_id(collection_id: &str, source_id: &str, target_id: &str) -> String {
    v5(&format!("trellis:edge:{collection_id}:{source_id}:{target_id}"))
}
