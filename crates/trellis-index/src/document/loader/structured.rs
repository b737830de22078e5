use std::path::Path;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader, LoadFuture, checked_path,
};

/// JSON and TOML, re-serialized as pretty JSON with sorted keys so that
/// formatting differences do not change the indexed text.
pub struct StructuredLoader {
    pub max_file_size: u64,
}

impl Default for StructuredLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

fn canonical_json(ext: &str, raw: &str) -> Result<String, DocumentError> {
    let value: serde_json::Value = match ext {
        "json" => serde_json::from_str(raw).map_err(|e| DocumentError::Parse {
            format: "json",
            reason: e.to_string(),
        })?,
        "toml" => {
            let table: toml::Table = toml::from_str(raw).map_err(|e| DocumentError::Parse {
                format: "toml",
                reason: e.to_string(),
            })?;
            serde_json::to_value(table).map_err(|e| DocumentError::Parse {
                format: "toml",
                reason: e.to_string(),
            })?
        }
        other => return Err(DocumentError::UnsupportedFormat(other.to_string())),
    };
    serde_json::to_string_pretty(&value).map_err(|e| DocumentError::Parse {
        format: "json",
        reason: e.to_string(),
    })
}

impl DocumentLoader for StructuredLoader {
    fn load(&self, path: &Path) -> LoadFuture<'_> {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();

            let raw = tokio::fs::read_to_string(&path).await?;
            let content = canonical_json(&ext, &raw)?;

            Ok(Document {
                content,
                source: path.display().to_string(),
                content_type: "application/json",
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "toml"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_reformatted_with_sorted_keys() {
        let out = canonical_json("json", r#"{"b":1,"a":[true,null]}"#).unwrap();
        assert_eq!(out, "{\n  \"a\": [\n    true,\n    null\n  ],\n  \"b\": 1\n}");
    }

    #[test]
    fn equivalent_json_canonicalizes_identically() {
        let a = canonical_json("json", r#"{"x": 1, "y": "z"}"#).unwrap();
        let b = canonical_json("json", "{\n\"y\":\"z\",\"x\":1}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn toml_becomes_json() {
        let out = canonical_json("toml", "[server]\nport = 8080\n").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["server"]["port"], 8080);
    }

    #[test]
    fn malformed_input_is_parse_error() {
        assert!(matches!(
            canonical_json("json", "{not json"),
            Err(DocumentError::Parse { format: "json", .. })
        ));
        assert!(matches!(
            canonical_json("toml", "= broken"),
            Err(DocumentError::Parse { format: "toml", .. })
        ));
    }

    #[tokio::test]
    async fn load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("package.json");
        std::fs::write(&file, r#"{"name":"demo"}"#).unwrap();

        let doc = StructuredLoader::default().load(&file).await.unwrap();
        assert_eq!(doc.content, "{\n  \"name\": \"demo\"\n}");
        assert_eq!(doc.content_type, "application/json");
    }
}
