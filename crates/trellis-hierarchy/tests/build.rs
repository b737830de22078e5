use std::collections::HashSet;
use std::path::Path;

use proptest::prelude::*;
use trellis_hierarchy::{BuilderConfig, Hierarchy, HierarchyBuilder, NodeKind};

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

async fn build(root: &Path) -> Hierarchy {
    HierarchyBuilder::new(BuilderConfig::default())
        .build(root)
        .await
        .unwrap()
}

fn assert_well_formed(h: &Hierarchy) {
    let root = h.root().expect("root node");
    assert!(root.parent_id.is_none());
    let mut seen = HashSet::new();
    for node in h.nodes() {
        assert!(seen.insert(node.id.clone()), "duplicate id {}", node.id);
        if node.id == root.id {
            continue;
        }
        let parent_id = node.parent_id.as_ref().expect("non-root has parent");
        let parent = h.get(parent_id).expect("parent present in build");
        assert!(parent.child_ids.contains(&node.id));
        assert!(seen.contains(parent_id), "parent precedes child");
    }
}

#[tokio::test]
async fn single_ts_file_yields_file_and_function() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "math.ts",
        "import './x'\nfunction add(a, b) {\n  return a + b;\n}\n",
    );

    let h = build(dir.path()).await;
    assert_well_formed(&h);

    let kinds: Vec<_> = h.nodes().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Directory, NodeKind::File, NodeKind::Function]
    );

    let file = &h.nodes()[1];
    assert_eq!(file.metadata.language.as_deref(), Some("typescript"));
    assert_eq!(file.metadata.dependencies.as_deref(), Some(&["./x".to_string()][..]));
    assert!(file.content.as_deref().unwrap().contains("function add"));

    let func = &h.nodes()[2];
    assert_eq!(func.name, "add");
    assert_eq!(func.metadata.line_range, Some((2, 4)));
    assert_eq!(func.metadata.complexity, Some(1));
    assert_eq!(func.parent_id.as_ref(), Some(&file.id));
}

#[tokio::test]
async fn no_recognized_files_leaves_only_directories() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "assets/logo.png", "png");
    write(dir.path(), "assets/fonts/a.woff", "woff");
    write(dir.path(), "Makefile", "all:");

    let h = build(dir.path()).await;
    assert_well_formed(&h);
    assert!(h.nodes().iter().all(|n| n.kind == NodeKind::Directory));
    assert_eq!(h.len(), 3);
    assert_eq!(h.summary().files, 0);
}

#[tokio::test]
async fn depth_first_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b/z.py", "x = 1\n");
    write(dir.path(), "a/y.py", "y = 2\n");
    write(dir.path(), "c.py", "z = 3\n");

    let h = build(dir.path()).await;
    let names: Vec<_> = h.nodes().iter().skip(1).map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["a", "y.py", "b", "z.py", "c.py"]);
}

#[tokio::test]
async fn rebuild_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/lib.rs", "pub fn one() {}\npub fn two() {}\n");
    write(dir.path(), "src/app.py", "class App:\n    def run(self):\n        pass\n");

    let first: Vec<_> = build(dir.path()).await.nodes().iter().map(|n| n.id.clone()).collect();
    let second: Vec<_> = build(dir.path()).await.nodes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(first, second);
}

#[tokio::test]
async fn same_named_elements_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "dup.js",
        "function handler() {}\n\nfunction handler() { return 2; }\n",
    );

    let h = build(dir.path()).await;
    assert_well_formed(&h);
    let handlers: Vec<_> = h.nodes().iter().filter(|n| n.name == "handler").collect();
    assert_eq!(handlers.len(), 2);
    assert_ne!(handlers[0].id, handlers[1].id);
}

#[tokio::test]
async fn hierarchy_path_and_search() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/auth/login.ts", "export class LoginService {}\n");

    let h = build(dir.path()).await;
    let class = h
        .nodes()
        .iter()
        .find(|n| n.kind == NodeKind::Class)
        .unwrap();
    let root_name = h.root().unwrap().name.clone();
    assert_eq!(
        h.hierarchy_path(&class.id).unwrap(),
        format!("{root_name}/src/auth/login.ts/LoginService")
    );

    let hits = h.search("loginservice", 5);
    assert_eq!(hits[0].node.id, class.id);
}

fn tree_strategy() -> impl Strategy<Value = Vec<(Vec<String>, String)>> {
    let segment = "[a-z]{1,4}";
    let ext = prop_oneof![Just("ts"), Just("py"), Just("rs"), Just("md"), Just("bin")];
    prop::collection::vec(
        (
            prop::collection::vec(segment, 0..3),
            ("[a-z]{1,5}", ext).prop_map(|(n, e)| format!("{n}.{e}")),
        ),
        0..8,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_non_root_node_has_a_parent(tree in tree_strategy()) {
        let dir = tempfile::tempdir().unwrap();
        for (dirs, file) in &tree {
            let mut rel = dirs.join("/");
            if !rel.is_empty() {
                rel.push('/');
            }
            rel.push_str(file);
            write(dir.path(), &rel, "function f() { if (a) {} }\n");
        }

        let rt = tokio::runtime::Runtime::new().unwrap();
        let h = rt.block_on(build(dir.path()));
        assert_well_formed(&h);
    }
}
