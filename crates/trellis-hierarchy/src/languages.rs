//! Language detection and the extension allow-list.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Recognized source language. Files whose extension maps to none of these are
/// not part of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    Kotlin,
    CSharp,
    C,
    Cpp,
    Swift,
    Php,
    Ruby,
    Scala,
    Shell,
    Vue,
    Svelte,
    Html,
    Css,
    Sql,
    Json,
    Yaml,
    Toml,
    Xml,
    Markdown,
}

/// Grammar family used to pick an element extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxFamily {
    /// Brace-delimited `function` / `class` / `interface` syntax
    /// (TS, JS, Java, C#, Kotlin, PHP, Swift, Scala, C, C++).
    CLike,
    Go,
    Python,
    Rust,
    /// Markup, config, and data formats: indexed as files, no elements.
    Opaque,
}

impl Lang {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::CSharp => "csharp",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Swift => "swift",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Scala => "scala",
            Self::Shell => "shell",
            Self::Vue => "vue",
            Self::Svelte => "svelte",
            Self::Html => "html",
            Self::Css => "css",
            Self::Sql => "sql",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Xml => "xml",
            Self::Markdown => "markdown",
        }
    }

    #[must_use]
    pub fn family(self) -> SyntaxFamily {
        match self {
            Self::TypeScript
            | Self::JavaScript
            | Self::Java
            | Self::Kotlin
            | Self::CSharp
            | Self::C
            | Self::Cpp
            | Self::Swift
            | Self::Php
            | Self::Scala
            | Self::Vue
            | Self::Svelte => SyntaxFamily::CLike,
            Self::Go => SyntaxFamily::Go,
            Self::Python => SyntaxFamily::Python,
            Self::Rust => SyntaxFamily::Rust,
            Self::Ruby
            | Self::Shell
            | Self::Html
            | Self::Css
            | Self::Sql
            | Self::Json
            | Self::Yaml
            | Self::Toml
            | Self::Xml
            | Self::Markdown => SyntaxFamily::Opaque,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Detect language from file extension.
#[must_use]
pub fn detect_language(path: &Path) -> Option<Lang> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let lang = match ext.as_str() {
        "ts" | "tsx" | "mts" | "cts" => Lang::TypeScript,
        "js" | "jsx" | "mjs" | "cjs" => Lang::JavaScript,
        "py" | "pyi" => Lang::Python,
        "rs" => Lang::Rust,
        "go" => Lang::Go,
        "java" => Lang::Java,
        "kt" | "kts" => Lang::Kotlin,
        "cs" => Lang::CSharp,
        "c" | "h" => Lang::C,
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Lang::Cpp,
        "swift" => Lang::Swift,
        "php" => Lang::Php,
        "rb" => Lang::Ruby,
        "scala" => Lang::Scala,
        "sh" | "bash" | "zsh" => Lang::Shell,
        "vue" => Lang::Vue,
        "svelte" => Lang::Svelte,
        "html" | "htm" => Lang::Html,
        "css" | "scss" | "sass" | "less" => Lang::Css,
        "sql" => Lang::Sql,
        "json" | "jsonc" => Lang::Json,
        "yaml" | "yml" => Lang::Yaml,
        "toml" => Lang::Toml,
        "xml" => Lang::Xml,
        "md" | "markdown" | "mdx" => Lang::Markdown,
        _ => return None,
    };
    Some(lang)
}

/// Check if a file belongs in the hierarchy.
#[must_use]
pub fn is_recognized(path: &Path) -> bool {
    detect_language(path).is_some()
}
