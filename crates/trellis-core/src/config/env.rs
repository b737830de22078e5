use std::str::FromStr;

use super::Config;

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring invalid {key} value: {raw}");
            None
        }
    }
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TRELLIS_SQLITE_PATH") {
            self.store.sqlite_path = v;
        }
        if let Ok(v) = std::env::var("TRELLIS_EMBEDDING_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.embedding.provider = kind;
            } else {
                tracing::warn!("ignoring invalid TRELLIS_EMBEDDING_PROVIDER value: {v}");
            }
        }
        if let Some(dims) = parsed("TRELLIS_EMBEDDING_DIMENSIONS") {
            self.embedding.dimensions = dims;
        }
        if let Some(secs) = parsed("TRELLIS_EMBEDDING_TIMEOUT") {
            self.embedding.timeout_secs = secs;
        }
        if let Some(n) = parsed("TRELLIS_EMBEDDING_MAX_RETRIES") {
            self.embedding.max_retries = n;
        }
        self.apply_env_overrides_index();
        self.apply_env_overrides_search();
    }

    fn apply_env_overrides_index(&mut self) {
        if let Some(t) = parsed("TRELLIS_INDEX_SIMILARITY_THRESHOLD") {
            self.index.similarity_threshold = t;
        }
        if let Some(n) = parsed("TRELLIS_INDEX_MAX_CONTENT_BYTES") {
            self.index.max_content_bytes = n;
        }
        if let Some(b) = parsed("TRELLIS_INDEX_RESPECT_GITIGNORE") {
            self.index.respect_gitignore = b;
        }
        if let Some(b) = parsed("TRELLIS_INDEX_INCLUDE_HIDDEN") {
            self.index.include_hidden = b;
        }
        if let Some(n) = parsed("TRELLIS_INDEX_MAX_FILE_SIZE") {
            self.index.max_file_size = n;
        }
        if let Some(n) = parsed("TRELLIS_INDEX_MAX_DOCUMENT_SIZE") {
            self.index.max_document_size = n;
        }
    }

    fn apply_env_overrides_search(&mut self) {
        if let Some(n) = parsed("TRELLIS_SEARCH_LIMIT") {
            self.search.default_limit = n;
        }
        if let Some(t) = parsed("TRELLIS_SEARCH_THRESHOLD") {
            self.search.default_threshold = t;
        }
        if let Some(w) = parsed("TRELLIS_SEARCH_VECTOR_WEIGHT") {
            self.search.vector_weight = w;
        }
        if let Some(w) = parsed("TRELLIS_SEARCH_STRUCTURAL_WEIGHT") {
            self.search.structural_weight = w;
        }
        if let Some(w) = parsed("TRELLIS_SEARCH_GRAPH_WEIGHT") {
            self.search.graph_weight = w;
        }
        if let Some(n) = parsed("TRELLIS_SEARCH_GRAPH_DEPTH") {
            self.search.graph_depth = n;
        }
        if let Some(n) = parsed("TRELLIS_SEARCH_GRAPH_FANOUT") {
            self.search.graph_fanout = n;
        }
    }
}
