//! Depth-first tree walk producing a [`Hierarchy`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::watch;

use crate::error::{HierarchyError, Result};
use crate::extract::extractor_for;
use crate::hierarchy::Hierarchy;
use crate::languages::{Lang, SyntaxFamily, detect_language};
use crate::metrics::{complexity, dependencies};
use crate::node::{HierarchyNode, NodeId, NodeKind, NodeMetadata};

/// Walk options.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Honor `.gitignore`, `.ignore` and git exclude files.
    pub respect_gitignore: bool,
    pub include_hidden: bool,
    /// Files larger than this many bytes are skipped.
    pub max_file_size: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: 1024 * 1024,
        }
    }
}

pub struct HierarchyBuilder {
    config: BuilderConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl HierarchyBuilder {
    #[must_use]
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            shutdown: None,
        }
    }

    /// Abort the build with [`HierarchyError::Cancelled`] once `rx` reads `true`.
    #[must_use]
    pub fn with_shutdown(mut self, rx: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(rx);
        self
    }

    fn cancelled(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Build the hierarchy rooted at `root`.
    ///
    /// Unreadable entries are logged and skipped. Directories are always kept,
    /// even when empty or unreadable.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::FileSystem`] if `root` is missing or not a
    /// directory, and [`HierarchyError::Cancelled`] if the shutdown signal fires.
    pub async fn build(&self, root: &Path) -> Result<Hierarchy> {
        let root = canonical_root(root).await?;
        let start = std::time::Instant::now();

        let walker = ignore::WalkBuilder::new(&root)
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .ignore(self.config.respect_gitignore)
            .parents(self.config.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(std::cmp::Ord::cmp)
            .build();

        let mut hierarchy = Hierarchy::new(root.clone());
        let mut dirs: HashMap<PathBuf, NodeId> = HashMap::new();

        for entry in walker {
            if self.cancelled() {
                tracing::info!(root = %root.display(), "hierarchy build cancelled");
                return Err(HierarchyError::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            let parent_id = if entry.depth() == 0 {
                None
            } else {
                let Some(id) = path.parent().and_then(|p| dirs.get(p)) else {
                    tracing::debug!(path = %path.display(), "parent not in hierarchy, skipping");
                    continue;
                };
                Some(id.clone())
            };

            if file_type.is_dir() {
                let node = directory_node(path, parent_id);
                dirs.insert(path.to_path_buf(), node.id.clone());
                hierarchy.push(node);
            } else if file_type.is_file() {
                let Some(lang) = detect_language(path) else {
                    continue;
                };
                if let Ok(meta) = entry.metadata()
                    && meta.len() > self.config.max_file_size
                {
                    tracing::debug!(path = %path.display(), size = meta.len(), "file too large, skipping");
                    continue;
                }
                let Some(parent_id) = parent_id else {
                    continue;
                };
                self.add_file(&mut hierarchy, path, lang, parent_id).await;
            }
        }

        fill_directory_sizes(&mut hierarchy);

        tracing::debug!(
            root = %root.display(),
            nodes = hierarchy.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "hierarchy built"
        );
        Ok(hierarchy)
    }

    async fn add_file(&self, hierarchy: &mut Hierarchy, path: &Path, lang: Lang, parent_id: NodeId) {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read file, skipping");
                return;
            }
        };
        let Ok(source) = String::from_utf8(bytes) else {
            tracing::warn!(path = %path.display(), "file is not valid UTF-8, skipping");
            return;
        };

        let family = lang.family();
        let coded = family != SyntaxFamily::Opaque;
        let deps = if coded { dependencies(&source, family) } else { Vec::new() };
        let file_id = NodeId::for_path(path);

        let file = HierarchyNode {
            id: file_id.clone(),
            kind: NodeKind::File,
            name: file_name(path),
            path: path.to_path_buf(),
            parent_id: Some(parent_id),
            child_ids: Vec::new(),
            metadata: NodeMetadata {
                size: Some(source.len() as u64),
                language: Some(lang.id().to_string()),
                complexity: coded.then(|| complexity(&source)),
                dependencies: (!deps.is_empty()).then_some(deps),
                line_range: None,
            },
            content: None,
        };
        if !hierarchy.push(file) {
            return;
        }

        if let Some(extractor) = extractor_for(lang) {
            for element in extractor.extract(&source) {
                let body = element.slice(&source);
                let id = NodeId::for_element(&file_id, &element.name, element.line_range.0);
                let node = HierarchyNode {
                    id,
                    kind: element.kind,
                    name: element.name.clone(),
                    path: path.to_path_buf(),
                    parent_id: Some(file_id.clone()),
                    child_ids: Vec::new(),
                    content: Some(body.to_string()),
                    metadata: NodeMetadata {
                        size: Some(body.len() as u64),
                        language: Some(lang.id().to_string()),
                        complexity: Some(complexity(body)),
                        dependencies: None,
                        line_range: Some(element.line_range),
                    },
                };
                if !hierarchy.push(node) {
                    tracing::debug!(
                        path = %path.display(),
                        element = %element.name,
                        "duplicate element id, skipping"
                    );
                }
            }
        }

        // Content is attached after extraction so the source is moved, not cloned.
        if let Some(file) = hierarchy
            .nodes_mut()
            .iter_mut()
            .rev()
            .find(|n| n.id == file_id)
        {
            file.content = Some(source);
        }
    }
}

async fn canonical_root(root: &Path) -> Result<PathBuf> {
    let fs_err = |reason: String| HierarchyError::FileSystem {
        path: root.to_path_buf(),
        reason,
    };
    let canonical = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| fs_err(e.to_string()))?;
    let meta = tokio::fs::metadata(&canonical)
        .await
        .map_err(|e| fs_err(e.to_string()))?;
    if !meta.is_dir() {
        return Err(fs_err("not a directory".into()));
    }
    Ok(canonical)
}

fn directory_node(path: &Path, parent_id: Option<NodeId>) -> HierarchyNode {
    HierarchyNode {
        id: NodeId::for_path(path),
        kind: NodeKind::Directory,
        name: file_name(path),
        path: path.to_path_buf(),
        parent_id,
        child_ids: Vec::new(),
        content: None,
        metadata: NodeMetadata::default(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Children follow their parent in discovery order, so a reverse sweep sees
/// every child's final size before its parent.
fn fill_directory_sizes(hierarchy: &mut Hierarchy) {
    let mut sizes: HashMap<NodeId, u64> = HashMap::new();
    for node in hierarchy.nodes_mut().iter_mut().rev() {
        match node.kind {
            NodeKind::File => {
                sizes.insert(node.id.clone(), node.metadata.size.unwrap_or(0));
            }
            NodeKind::Directory => {
                let total = node
                    .child_ids
                    .iter()
                    .filter_map(|c| sizes.get(c))
                    .sum::<u64>();
                node.metadata.size = Some(total);
                sizes.insert(node.id.clone(), total);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[tokio::test]
    async fn missing_root_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HierarchyBuilder::new(BuilderConfig::default())
            .build(&dir.path().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::FileSystem { .. }));
    }

    #[tokio::test]
    async fn file_root_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.ts", "");
        let err = HierarchyBuilder::new(BuilderConfig::default())
            .build(&dir.path().join("a.ts"))
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::FileSystem { .. }));
    }

    #[tokio::test]
    async fn empty_root_has_single_node() {
        let dir = tempfile::tempdir().unwrap();
        let h = HierarchyBuilder::new(BuilderConfig::default())
            .build(dir.path())
            .await
            .unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.root().unwrap().kind, NodeKind::Directory);
        assert_eq!(h.root().unwrap().metadata.size, Some(0));
    }

    #[tokio::test]
    async fn unrecognized_and_large_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "image.png", "binary");
        write(dir.path(), "big.ts", &"x".repeat(64));
        write(dir.path(), "ok.ts", "const a = 1;");
        let config = BuilderConfig {
            max_file_size: 32,
            ..BuilderConfig::default()
        };
        let h = HierarchyBuilder::new(config).build(dir.path()).await.unwrap();
        let names: Vec<_> = h.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"ok.ts"));
    }

    #[tokio::test]
    async fn non_utf8_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.py"), [0xff, 0xfe, 0x00]).unwrap();
        let h = HierarchyBuilder::new(BuilderConfig::default())
            .build(dir.path())
            .await
            .unwrap();
        assert_eq!(h.len(), 1);
    }

    #[tokio::test]
    async fn hidden_entries_follow_config() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".secret/a.ts", "const a = 1;");

        let h = HierarchyBuilder::new(BuilderConfig::default())
            .build(dir.path())
            .await
            .unwrap();
        assert_eq!(h.len(), 1);

        let config = BuilderConfig {
            include_hidden: true,
            ..BuilderConfig::default()
        };
        let h = HierarchyBuilder::new(config).build(dir.path()).await.unwrap();
        assert_eq!(h.len(), 3);
    }

    #[tokio::test]
    async fn gitignore_respected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", "dist/\n");
        write(dir.path(), "dist/out.js", "function built() {}");
        write(dir.path(), "src/in.js", "function source() {}");
        let h = HierarchyBuilder::new(BuilderConfig::default())
            .build(dir.path())
            .await
            .unwrap();
        assert!(h.nodes().iter().all(|n| n.name != "out.js"));
        assert!(h.nodes().iter().any(|n| n.name == "in.js"));
    }

    #[tokio::test]
    async fn directory_size_sums_descendant_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/one.md", "12345");
        write(dir.path(), "a/b/two.md", "123");
        write(dir.path(), "three.md", "12");
        let h = HierarchyBuilder::new(BuilderConfig::default())
            .build(dir.path())
            .await
            .unwrap();
        let size_of = |name: &str| {
            h.nodes()
                .iter()
                .find(|n| n.name == name)
                .and_then(|n| n.metadata.size)
        };
        assert_eq!(size_of("b"), Some(3));
        assert_eq!(size_of("a"), Some(8));
        assert_eq!(h.root().unwrap().metadata.size, Some(10));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_subtree_does_not_abort_build() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "locked/hidden.ts", "function hidden() {}");
        write(dir.path(), "open/visible.ts", "function visible() {}");
        let locked = dir.path().join("locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind root.
        if std::fs::read_dir(&locked).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = HierarchyBuilder::new(BuilderConfig::default())
            .build(dir.path())
            .await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        let h = result.unwrap();
        let names: Vec<_> = h.nodes().iter().map(|n| n.name.as_str()).collect();
        assert!(names.contains(&"visible.ts"));
        assert!(names.contains(&"visible"));
        assert!(names.contains(&"locked"));
        assert!(!names.contains(&"hidden.ts"));
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.ts", "function a() {}");
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let err = HierarchyBuilder::new(BuilderConfig::default())
            .with_shutdown(rx)
            .build(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::Cancelled));
    }
}
