//! Tag derivation for structural records.

use std::collections::BTreeSet;

use trellis_hierarchy::HierarchyNode;
use trellis_hierarchy::metrics::complexity_bucket;

/// Keywords that produce `topic:<keyword>` tags on external documents.
pub const TOPIC_VOCABULARY: &[&str] = &[
    "api",
    "architecture",
    "authentication",
    "cache",
    "configuration",
    "database",
    "deployment",
    "error",
    "logging",
    "performance",
    "security",
    "testing",
];

/// `lang:<language>`, `type:<kind>`, and `complexity:<bucket>` where known.
#[must_use]
pub fn node_tags(node: &HierarchyNode) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    if let Some(lang) = &node.metadata.language {
        tags.insert(format!("lang:{lang}"));
    }
    tags.insert(format!("type:{}", node.kind));
    if let Some(c) = node.metadata.complexity {
        tags.insert(format!("complexity:{}", complexity_bucket(c)));
    }
    tags
}

/// `markdown` for markdown sources, `code-examples` when a fenced block is
/// present, and one `topic:<kw>` per vocabulary word found as a whole word.
#[must_use]
pub fn document_tags(content: &str, content_type: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    if content_type == "text/markdown" {
        tags.insert("markdown".to_string());
    }
    if content.contains("```") {
        tags.insert("code-examples".to_string());
    }

    let words: BTreeSet<String> = content
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    for topic in TOPIC_VOCABULARY {
        if words.contains(*topic) {
            tags.insert(format!("topic:{topic}"));
        }
    }
    tags
}
