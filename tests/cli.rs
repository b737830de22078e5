use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn trellis(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("TRELLIS_SQLITE_PATH")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn setup(dir: &Path) -> std::path::PathBuf {
    let src = dir.join("project/src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(
        src.join("auth.ts"),
        "export function login(user) {\n  return user;\n}\n",
    )
    .unwrap();
    std::fs::write(dir.join("project/NOTES.md"), "# Notes\n\nCache layout.\n").unwrap();

    let config = dir.join("trellis.toml");
    std::fs::write(
        &config,
        format!(
            "[store]\nsqlite_path = \"{}\"\n",
            dir.join("db/trellis.db").display()
        ),
    )
    .unwrap();
    config
}

#[test]
fn index_search_stats_clear_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let project = dir.path().join("project");

    let report = json(&trellis(
        &config,
        &[
            "index",
            "--collection",
            "demo",
            "--codebase",
            project.join("src").to_str().unwrap(),
            "--doc",
            project.join("NOTES.md").to_str().unwrap(),
        ],
    ));
    assert_eq!(report["collection_id"], "demo");
    assert_eq!(report["documents"], 1);
    assert_eq!(report["vectors_written"], 3);

    let results = json(&trellis(&config, &["search", "login", "--collection", "demo"]));
    let results = results.as_array().unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0]["metadata"]["node_kind"], "function");

    let stats = json(&trellis(&config, &["stats", "--collection", "demo"]));
    assert_eq!(stats["vectors"], 3);

    let removed = json(&trellis(&config, &["clear", "demo"]));
    assert_eq!(removed["vectors"], 3);
    let stats = json(&trellis(&config, &["stats"]));
    assert_eq!(stats["vectors"], 0);
}

#[test]
fn hierarchy_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let summary = json(&trellis(
        &config,
        &["hierarchy", dir.path().join("project").to_str().unwrap()],
    ));
    assert_eq!(summary["files"], 2);
    assert_eq!(summary["functions"], 1);
}

#[test]
fn invalid_search_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let output = trellis(&config, &["search", "login", "--threshold", "2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("threshold"));
}

#[test]
fn invalid_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[embedding]\ndimensions = 0\n").unwrap();

    let output = trellis(&config, &["stats"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("embedding.dimensions"));
}
