//! Built hierarchy and its read-only query surface.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::node::{HierarchyNode, NodeId, NodeKind};

const NAME_SCORE: u32 = 10;
const PATH_SCORE: u32 = 5;
const CONTENT_SCORE: u32 = 3;

/// Highest score a single node can reach in [`Hierarchy::search`].
pub const MAX_MATCH_SCORE: u32 = NAME_SCORE + PATH_SCORE + CONTENT_SCORE;

/// Nodes of one build, in depth-first discovery order.
///
/// The first node is the root directory. Every other node's parent is present
/// and precedes it.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    root_path: PathBuf,
    nodes: Vec<HierarchyNode>,
    index: HashMap<NodeId, usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct NodeMatch<'a> {
    pub node: &'a HierarchyNode,
    /// Sum of name (10), path (5), and content (3) hits.
    pub score: u32,
}

impl NodeMatch<'_> {
    /// Score scaled to `[0, 1]`.
    #[must_use]
    pub fn normalized(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let score = self.score as f32 / MAX_MATCH_SCORE as f32;
        score
    }
}

/// Node counts for a build, returned by the `hierarchy` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchySummary {
    pub root: PathBuf,
    pub total_nodes: usize,
    pub directories: usize,
    pub files: usize,
    pub functions: usize,
    pub classes: usize,
    pub interfaces: usize,
    /// Bytes across all file nodes.
    pub total_size: u64,
    /// File count per language id.
    pub languages: BTreeMap<String, usize>,
}

impl Hierarchy {
    pub(crate) fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            ..Self::default()
        }
    }

    /// Append `node` and register it with its parent. Returns `false` and
    /// drops the node if its id is already present or its parent is not.
    pub(crate) fn push(&mut self, node: HierarchyNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        if let Some(parent_id) = &node.parent_id {
            let Some(&parent) = self.index.get(parent_id) else {
                return false;
            };
            self.nodes[parent].child_ids.push(node.id.clone());
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [HierarchyNode] {
        &mut self.nodes
    }

    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    #[must_use]
    pub fn root(&self) -> Option<&HierarchyNode> {
        self.nodes.first()
    }

    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&HierarchyNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    #[must_use]
    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct children in discovery order. Unknown ids yield nothing.
    #[must_use]
    pub fn children(&self, id: &NodeId) -> Vec<&HierarchyNode> {
        self.get(id)
            .map(|n| n.child_ids.iter().filter_map(|c| self.get(c)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, id: &NodeId) -> Option<&HierarchyNode> {
        self.get(id)?.parent_id.as_ref().and_then(|p| self.get(p))
    }

    /// Parent first, root last.
    #[must_use]
    pub fn ancestors(&self, id: &NodeId) -> Vec<&HierarchyNode> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = node.parent_id.as_ref().and_then(|p| self.get(p));
        }
        out
    }

    /// Slash-joined names from the root to `id`, or `None` for unknown ids.
    #[must_use]
    pub fn hierarchy_path(&self, id: &NodeId) -> Option<String> {
        let node = self.get(id)?;
        let mut names: Vec<&str> = self
            .ancestors(id)
            .iter()
            .rev()
            .map(|n| n.name.as_str())
            .collect();
        names.push(&node.name);
        Some(names.join("/"))
    }

    /// Case-insensitive substring search over name, path, and content.
    ///
    /// Linear in the number of nodes. Results are ordered by descending score,
    /// ties keep discovery order.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<NodeMatch<'_>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matches: Vec<NodeMatch<'_>> = self
            .nodes
            .iter()
            .filter_map(|node| {
                let mut score = 0;
                if node.name.to_lowercase().contains(&needle) {
                    score += NAME_SCORE;
                }
                if node.path.to_string_lossy().to_lowercase().contains(&needle) {
                    score += PATH_SCORE;
                }
                if node
                    .content
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
                {
                    score += CONTENT_SCORE;
                }
                (score > 0).then_some(NodeMatch { node, score })
            })
            .collect();

        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(limit);
        matches
    }

    #[must_use]
    pub fn summary(&self) -> HierarchySummary {
        let mut summary = HierarchySummary {
            root: self.root_path.clone(),
            total_nodes: self.nodes.len(),
            ..HierarchySummary::default()
        };
        for node in &self.nodes {
            match node.kind {
                NodeKind::Directory => summary.directories += 1,
                NodeKind::File => {
                    summary.files += 1;
                    summary.total_size += node.metadata.size.unwrap_or(0);
                    if let Some(lang) = &node.metadata.language {
                        *summary.languages.entry(lang.clone()).or_default() += 1;
                    }
                }
                NodeKind::Function => summary.functions += 1,
                NodeKind::Class => summary.classes += 1,
                NodeKind::Interface => summary.interfaces += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeMetadata;

    fn node(path: &str, kind: NodeKind, parent: Option<&NodeId>, content: Option<&str>) -> HierarchyNode {
        let path = PathBuf::from(path);
        HierarchyNode {
            id: NodeId::for_path(&path),
            kind,
            name: path
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned()),
            path,
            parent_id: parent.cloned(),
            child_ids: Vec::new(),
            content: content.map(str::to_string),
            metadata: NodeMetadata::default(),
        }
    }

    fn sample() -> Hierarchy {
        let mut h = Hierarchy::new(PathBuf::from("/repo"));
        let root = node("/repo", NodeKind::Directory, None, None);
        let root_id = root.id.clone();
        let src = node("/repo/src", NodeKind::Directory, Some(&root_id), None);
        let src_id = src.id.clone();
        let file = node(
            "/repo/src/auth.ts",
            NodeKind::File,
            Some(&src_id),
            Some("export function login() {}"),
        );
        assert!(h.push(root));
        assert!(h.push(src));
        assert!(h.push(file));
        h
    }

    #[test]
    fn push_links_parent() {
        let h = sample();
        let root = h.root().unwrap();
        assert_eq!(h.children(&root.id).len(), 1);
        assert_eq!(h.children(&root.id)[0].name, "src");
    }

    #[test]
    fn push_rejects_duplicates_and_orphans() {
        let mut h = sample();
        let dup = node("/repo/src", NodeKind::Directory, None, None);
        assert!(!h.push(dup));
        let orphan_parent = NodeId("missing".into());
        let orphan = node("/elsewhere/x.ts", NodeKind::File, Some(&orphan_parent), None);
        assert!(!h.push(orphan));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn ancestors_and_path() {
        let h = sample();
        let file_id = NodeId::for_path(Path::new("/repo/src/auth.ts"));
        let names: Vec<_> = h.ancestors(&file_id).iter().map(|n| n.name.clone()).collect();
        assert_eq!(names, vec!["src", "repo"]);
        assert_eq!(h.hierarchy_path(&file_id).as_deref(), Some("repo/src/auth.ts"));
        assert!(h.hierarchy_path(&NodeId("nope".into())).is_none());
    }

    #[test]
    fn parent_of_root_is_none() {
        let h = sample();
        let root_id = h.root().unwrap().id.clone();
        assert!(h.parent(&root_id).is_none());
    }

    #[test]
    fn search_scores_name_path_content() {
        let h = sample();
        let hits = h.search("AUTH", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, NAME_SCORE + PATH_SCORE);

        let hits = h.search("login", 10);
        assert_eq!(hits[0].score, CONTENT_SCORE);

        let hits = h.search("src", 10);
        assert_eq!(hits[0].node.name, "src");
        assert_eq!(hits[0].score, NAME_SCORE + PATH_SCORE);
        assert_eq!(hits[1].score, PATH_SCORE);
    }

    #[test]
    fn search_respects_limit_and_blank_query() {
        let h = sample();
        assert_eq!(h.search("repo", 1).len(), 1);
        assert!(h.search("   ", 10).is_empty());
        assert!(h.search("repo", 0).is_empty());
    }

    #[test]
    fn normalized_score_is_unit_range() {
        let h = sample();
        let m = NodeMatch {
            node: h.root().unwrap(),
            score: MAX_MATCH_SCORE,
        };
        assert!((m.normalized() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn summary_counts_kinds() {
        let h = sample();
        let s = h.summary();
        assert_eq!(s.total_nodes, 3);
        assert_eq!(s.directories, 2);
        assert_eq!(s.files, 1);
        assert_eq!(s.functions, 0);
    }
}
