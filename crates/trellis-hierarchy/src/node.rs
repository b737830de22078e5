use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable node identifier derived from the node's location.
///
/// Same absolute path ⇒ same id across builds. Used as a primary key only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let key = path.to_string_lossy();
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string())
    }

    /// Id for a code element: the parent file's id, the element name, and the
    /// 1-based line it starts on, so same-named elements in one file do not
    /// collide.
    #[must_use]
    pub fn for_element(file: &NodeId, name: &str, line: usize) -> Self {
        let key = format!("{}#{name}@{line}", file.0);
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
    Function,
    Class,
    Interface,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
            Self::Function => "function",
            Self::Class => "class",
            Self::Interface => "interface",
        }
    }

    /// Whether nodes of this kind carry source text.
    #[must_use]
    pub fn has_content(self) -> bool {
        !matches!(self, Self::Directory)
    }

    #[must_use]
    pub fn is_element(self) -> bool {
        matches!(self, Self::Function | Self::Class | Self::Interface)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    /// 1-based inclusive line range, elements only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub path: PathBuf,
    pub parent_id: Option<NodeId>,
    pub child_ids: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub metadata: NodeMetadata,
}

impl HierarchyNode {
    /// Content if present and not empty.
    #[must_use]
    pub fn indexable_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_id_is_stable() {
        let a = NodeId::for_path(Path::new("/repo/src/lib.rs"));
        let b = NodeId::for_path(Path::new("/repo/src/lib.rs"));
        assert_eq!(a, b);
    }

    #[test]
    fn different_paths_differ() {
        assert_ne!(
            NodeId::for_path(Path::new("/repo/a.ts")),
            NodeId::for_path(Path::new("/repo/b.ts"))
        );
    }

    #[test]
    fn element_ids_disambiguated_by_line() {
        let file = NodeId::for_path(Path::new("/repo/a.ts"));
        let first = NodeId::for_element(&file, "handler", 3);
        let second = NodeId::for_element(&file, "handler", 40);
        assert_ne!(first, second);
        assert_eq!(first, NodeId::for_element(&file, "handler", 3));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&NodeKind::Interface).unwrap();
        assert_eq!(json, "\"interface\"");
    }

    #[test]
    fn only_directories_lack_content() {
        assert!(!NodeKind::Directory.has_content());
        assert!(NodeKind::File.has_content());
        assert!(NodeKind::Class.is_element());
        assert!(!NodeKind::File.is_element());
    }
}
