use std::sync::LazyLock;

use regex::Regex;

use super::body::{Lexical, brace_end, indent_end};
use super::{ElementExtractor, ExtractedElement, line_of};
use crate::node::NodeKind;

#[derive(Debug, Clone, Copy)]
enum BodyStyle {
    Braces(Lexical),
    Indent,
}

/// Regex-driven extractor for one grammar family.
///
/// Each pattern must capture the element name in a group called `name`.
/// Patterns are anchored at line starts, so declarations nested in other
/// declarations are found too and become siblings under the file.
pub struct PatternExtractor {
    patterns: Vec<(NodeKind, Regex)>,
    body: BodyStyle,
}

const C_LEXICAL: Lexical = Lexical {
    single_quote_strings: true,
    c_comments: true,
};

static C_LIKE: LazyLock<PatternExtractor> = LazyLock::new(|| PatternExtractor {
    patterns: vec![
        (
            NodeKind::Function,
            Regex::new(
                r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\b\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)",
            )
            .unwrap(),
        ),
        (
            NodeKind::Function,
            Regex::new(
                r"(?m)^[ \t]*(?:export\s+)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?::[^=\n]+)?=\s*(?:async\s+)?(?:function\b|(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=\n]+)?=>)",
            )
            .unwrap(),
        ),
        (
            NodeKind::Class,
            Regex::new(
                r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:(?:public|private|protected|internal|abstract|final|static|sealed|partial|open|data)\s+)*class\s+(?P<name>[A-Za-z_$][\w$]*)",
            )
            .unwrap(),
        ),
        (
            NodeKind::Interface,
            Regex::new(
                r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:(?:public|private|protected|internal|sealed)\s+)*interface\s+(?P<name>[A-Za-z_$][\w$]*)",
            )
            .unwrap(),
        ),
    ],
    body: BodyStyle::Braces(C_LEXICAL),
});

static GO: LazyLock<PatternExtractor> = LazyLock::new(|| PatternExtractor {
    patterns: vec![
        (
            NodeKind::Function,
            Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s*)?(?P<name>[A-Za-z_]\w*)").unwrap(),
        ),
        (
            NodeKind::Class,
            Regex::new(r"(?m)^type\s+(?P<name>[A-Za-z_]\w*)\s+struct\b").unwrap(),
        ),
        (
            NodeKind::Interface,
            Regex::new(r"(?m)^type\s+(?P<name>[A-Za-z_]\w*)\s+interface\b").unwrap(),
        ),
    ],
    body: BodyStyle::Braces(C_LEXICAL),
});

static PYTHON: LazyLock<PatternExtractor> = LazyLock::new(|| PatternExtractor {
    patterns: vec![
        (
            NodeKind::Function,
            Regex::new(r"(?m)^[ \t]*(?:async\s+)?def\s+(?P<name>[A-Za-z_]\w*)").unwrap(),
        ),
        (
            NodeKind::Class,
            Regex::new(r"(?m)^[ \t]*class\s+(?P<name>[A-Za-z_]\w*)").unwrap(),
        ),
    ],
    body: BodyStyle::Indent,
});

static RUST: LazyLock<PatternExtractor> = LazyLock::new(|| PatternExtractor {
    patterns: vec![
        (
            NodeKind::Function,
            Regex::new(
                r#"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+(?P<name>[A-Za-z_]\w*)"#,
            )
            .unwrap(),
        ),
        (
            NodeKind::Class,
            Regex::new(r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|union)\s+(?P<name>[A-Za-z_]\w*)")
                .unwrap(),
        ),
        (
            NodeKind::Interface,
            Regex::new(r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+(?P<name>[A-Za-z_]\w*)")
                .unwrap(),
        ),
    ],
    body: BodyStyle::Braces(Lexical {
        single_quote_strings: false,
        c_comments: true,
    }),
});

impl PatternExtractor {
    /// TS, JS, Java, C#, Kotlin, PHP, Swift, Scala, C, C++.
    #[must_use]
    pub fn c_like() -> &'static Self {
        &C_LIKE
    }

    #[must_use]
    pub fn go() -> &'static Self {
        &GO
    }

    #[must_use]
    pub fn python() -> &'static Self {
        &PYTHON
    }

    #[must_use]
    pub fn rust() -> &'static Self {
        &RUST
    }
}

impl ElementExtractor for PatternExtractor {
    fn extract(&self, source: &str) -> Vec<ExtractedElement> {
        let mut elements: Vec<ExtractedElement> = Vec::new();

        for (kind, re) in &self.patterns {
            for caps in re.captures_iter(source) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
                    continue;
                };
                // Modifier groups use `\s+` and may span lines; anchor at the
                // line holding the name.
                let start = source[..name.start()].rfind('\n').map_or(0, |p| p + 1);
                let start = start.max(whole.start());
                let end = match self.body {
                    BodyStyle::Braces(lex) => brace_end(source, name.end(), lex),
                    BodyStyle::Indent => indent_end(source, start),
                };
                let end = end.max(name.end());
                let last = source[..end].trim_end().len().max(name.end());

                elements.push(ExtractedElement {
                    name: name.as_str().to_string(),
                    kind: *kind,
                    start,
                    end,
                    line_range: (line_of(source, start), line_of(source, last)),
                });
            }
        }

        elements.sort_by_key(|e| (e.start, e.end));
        elements.dedup_by(|a, b| a.start == b.start && a.name == b.name);
        elements
    }
}
