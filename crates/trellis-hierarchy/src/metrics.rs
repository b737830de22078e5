//! Complexity proxy and import extraction.
//!
//! Both operate on raw text with regular expressions. Keywords inside string
//! literals and comments are counted too; the complexity number is a rough
//! cyclomatic proxy, not an AST-derived value.

use std::sync::LazyLock;

use regex::Regex;

use crate::languages::SyntaxFamily;

static BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:if|else|for|while|switch|case|catch)\b|&&|\|\|").unwrap()
});

static JS_IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s[^;'"]*?\bfrom\s*['"]([^'"]+)['"]"#).unwrap()
});
static JS_IMPORT_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s*['"]([^'"]+)['"]"#).unwrap());
static JS_REQUIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

static PY_FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\b").unwrap());
static PY_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s+([\w.]+)").unwrap());

static RUST_USE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([A-Za-z_][\w]*(?:::[A-Za-z_][\w]*)*)")
        .unwrap()
});

static GO_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:import\s+)?(?:[A-Za-z_.]\w*\s+)?"([^"]+)"\s*$"#).unwrap()
});
static GO_IMPORT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\bimport\s*\((.*?)\)").unwrap());
static GO_IMPORT_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s+(?:[A-Za-z_.]\w*\s+)?"([^"]+)""#).unwrap());

/// `1 + occurrences of if/else/for/while/switch/case/catch/&&/||`.
#[must_use]
pub fn complexity(source: &str) -> u32 {
    let hits = BRANCH_RE.find_iter(source).count();
    u32::try_from(hits).unwrap_or(u32::MAX).saturating_add(1)
}

/// Bucket used for `complexity:<bucket>` tags.
#[must_use]
pub fn complexity_bucket(value: u32) -> &'static str {
    if value > 10 {
        "high"
    } else if value > 5 {
        "medium"
    } else {
        "low"
    }
}

/// Import targets in source order, deduplicated. Paths are kept verbatim,
/// relative specifiers are not resolved.
#[must_use]
pub fn dependencies(source: &str, family: SyntaxFamily) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();
    let mut collect = |re: &Regex, text: &str, base: usize| {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                found.push((base + m.start(), m.as_str().to_string()));
            }
        }
    };

    match family {
        SyntaxFamily::CLike => {
            collect(&JS_IMPORT_FROM_RE, source, 0);
            collect(&JS_IMPORT_BARE_RE, source, 0);
            collect(&JS_REQUIRE_RE, source, 0);
        }
        SyntaxFamily::Python => {
            collect(&PY_FROM_RE, source, 0);
            collect(&PY_IMPORT_RE, source, 0);
        }
        SyntaxFamily::Rust => collect(&RUST_USE_RE, source, 0),
        SyntaxFamily::Go => {
            for block in GO_IMPORT_BLOCK_RE.captures_iter(source) {
                if let Some(body) = block.get(1) {
                    collect(&GO_IMPORT_RE, body.as_str(), body.start());
                }
            }
            collect(&GO_IMPORT_SINGLE_RE, source, 0);
        }
        SyntaxFamily::Opaque => {}
    }

    found.sort_by_key(|(pos, _)| *pos);
    let mut out: Vec<String> = Vec::with_capacity(found.len());
    for (_, dep) in found {
        if !out.contains(&dep) {
            out.push(dep);
        }
    }
    out
}
