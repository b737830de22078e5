use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Origin of a vector record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Codebase,
    ExternalDoc,
    Reference,
}

impl RecordKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Codebase => "codebase",
            Self::ExternalDoc => "external_doc",
            Self::Reference => "reference",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "codebase" => Ok(Self::Codebase),
            "external_doc" => Ok(Self::ExternalDoc),
            "reference" => Ok(Self::Reference),
            other => Err(format!("unknown record kind: {other}")),
        }
    }
}

/// JSON payload stored next to each vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Where the content came from: `"hierarchy"` or `"document"`.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_range: Option<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_path: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

/// Parameters for writing a vector record.
pub struct VectorInsert<'a> {
    pub id: &'a str,
    pub collection_id: &'a str,
    pub kind: RecordKind,
    pub content: &'a str,
    pub embedding: &'a [f32],
    pub metadata: &'a RecordMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub collection_id: String,
    pub kind: RecordKind,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: RecordMetadata,
    pub created_at: String,
}

/// Parameters for writing a structural index entry.
pub struct StructuralInsert<'a> {
    pub id: &'a str,
    pub collection_id: &'a str,
    pub node_id: &'a str,
    pub hierarchy_path: &'a str,
    pub tags: &'a BTreeSet<String>,
    pub content_hash: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralRecord {
    pub id: String,
    pub collection_id: String,
    /// Hierarchy node the entry was built from. Not enforced as a foreign key;
    /// hierarchies are rebuilt on every pass.
    pub node_id: String,
    pub hierarchy_path: String,
    pub tags: BTreeSet<String>,
    pub content_hash: String,
    pub created_at: String,
}

/// Structural entry joined with the vector record that shares its id.
#[derive(Debug, Clone)]
pub struct StructuralHit {
    pub record: StructuralRecord,
    pub kind: RecordKind,
    pub content: String,
    pub metadata: RecordMetadata,
}

/// Parameters for writing a graph edge.
pub struct EdgeInsert<'a> {
    pub id: &'a str,
    pub collection_id: &'a str,
    pub source_id: &'a str,
    pub target_id: &'a str,
    pub relation_type: &'a str,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub collection_id: String,
    pub source_id: String,
    pub target_id: String,
    pub relation_type: String,
    pub weight: f32,
    pub created_at: String,
}

impl GraphEdge {
    /// The endpoint opposite `id`, or `None` if `id` is not on this edge.
    #[must_use]
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source_id == id {
            Some(&self.target_id)
        } else if self.target_id == id {
            Some(&self.source_id)
        } else {
            None
        }
    }
}

/// Row counts per record family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub vectors: u64,
    pub structural: u64,
    pub edges: u64,
}
