use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 19] = [
    "TRELLIS_CONFIG",
    "TRELLIS_SQLITE_PATH",
    "TRELLIS_EMBEDDING_PROVIDER",
    "TRELLIS_EMBEDDING_DIMENSIONS",
    "TRELLIS_EMBEDDING_TIMEOUT",
    "TRELLIS_EMBEDDING_MAX_RETRIES",
    "TRELLIS_INDEX_SIMILARITY_THRESHOLD",
    "TRELLIS_INDEX_MAX_CONTENT_BYTES",
    "TRELLIS_INDEX_RESPECT_GITIGNORE",
    "TRELLIS_INDEX_INCLUDE_HIDDEN",
    "TRELLIS_INDEX_MAX_FILE_SIZE",
    "TRELLIS_INDEX_MAX_DOCUMENT_SIZE",
    "TRELLIS_SEARCH_LIMIT",
    "TRELLIS_SEARCH_THRESHOLD",
    "TRELLIS_SEARCH_VECTOR_WEIGHT",
    "TRELLIS_SEARCH_STRUCTURAL_WEIGHT",
    "TRELLIS_SEARCH_GRAPH_WEIGHT",
    "TRELLIS_SEARCH_GRAPH_DEPTH",
    "TRELLIS_SEARCH_GRAPH_FANOUT",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.store.sqlite_path, "data/trellis.db");
    assert_eq!(config.embedding.provider, ProviderKind::Hash);
    assert_eq!(config.embedding.dimensions, 1536);
    assert_eq!(config.embedding.max_retries, 3);
    assert!((config.index.similarity_threshold - 0.7).abs() < f32::EPSILON);
    assert!(config.index.respect_gitignore);
    assert!(!config.index.include_hidden);
    assert_eq!(config.search.default_limit, 10);
    assert!((config.search.default_threshold - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.search.graph_depth, 2);
    assert_eq!(config.search.graph_fanout, 5);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn missing_file_loads_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn parse_partial_toml() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trellis.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[store]
sqlite_path = ":memory:"

[embedding]
dimensions = 64

[search]
graph_depth = 3
vector_weight = 0.6
"#
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.store.sqlite_path, ":memory:");
    assert_eq!(config.embedding.dimensions, 64);
    assert_eq!(config.embedding.timeout_secs, 30);
    assert_eq!(config.search.graph_depth, 3);
    assert!((config.search.vector_weight - 0.6).abs() < f32::EPSILON);
    assert_eq!(config.search.graph_fanout, 5);
    assert_eq!(config.index, IndexConfig::default());
}

#[test]
#[serial]
fn malformed_toml_is_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[store\nsqlite_path = 1").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse config file"));
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("TRELLIS_SQLITE_PATH", "/tmp/x.db");
        std::env::set_var("TRELLIS_EMBEDDING_DIMENSIONS", "256");
        std::env::set_var("TRELLIS_INDEX_INCLUDE_HIDDEN", "true");
        std::env::set_var("TRELLIS_SEARCH_THRESHOLD", "0.25");
    };
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.store.sqlite_path, "/tmp/x.db");
    assert_eq!(config.embedding.dimensions, 256);
    assert!(config.index.include_hidden);
    assert!((config.search.default_threshold - 0.25).abs() < f32::EPSILON);
}

#[test]
#[serial]
fn invalid_env_values_ignored() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("TRELLIS_EMBEDDING_DIMENSIONS", "many");
        std::env::set_var("TRELLIS_EMBEDDING_PROVIDER", "openai");
    };
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.embedding.dimensions, 1536);
    assert_eq!(config.embedding.provider, ProviderKind::Hash);
}

#[test]
fn validate_rejects_bad_values() {
    let cases: [fn(&mut Config); 6] = [
        |c| c.embedding.dimensions = 0,
        |c| c.index.similarity_threshold = 1.5,
        |c| c.search.default_limit = 0,
        |c| c.search.default_threshold = -0.1,
        |c| c.search.graph_weight = -1.0,
        |c| {
            c.search.vector_weight = 0.0;
            c.search.structural_weight = 0.0;
            c.search.graph_weight = 0.0;
        },
    ];
    for mutate in cases {
        let mut config = Config::default();
        mutate(&mut config);
        assert!(config.validate().is_err(), "{config:?}");
    }
}

#[test]
#[serial]
fn config_path_resolution_order() {
    clear_env();
    assert_eq!(
        resolve_config_path(None),
        PathBuf::from(DEFAULT_CONFIG_PATH)
    );

    unsafe { std::env::set_var("TRELLIS_CONFIG", "/etc/trellis.toml") };
    assert_eq!(resolve_config_path(None), PathBuf::from("/etc/trellis.toml"));
    assert_eq!(
        resolve_config_path(Some(Path::new("cli.toml"))),
        PathBuf::from("cli.toml")
    );
    clear_env();
}

#[test]
fn search_section_maps_to_engine_config() {
    let engine = SearchConfig::default().engine();
    assert_eq!(engine.graph.depth, 2);
    assert!((engine.weights.vector - 0.4).abs() < f32::EPSILON);
    assert_eq!(IndexConfig::default().indexer().builder.max_file_size, 1024 * 1024);
}
