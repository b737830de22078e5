//! Pattern-based code element extraction.
//!
//! An [`ElementExtractor`] identifies named constructs (functions, classes,
//! interfaces) in source text. The shipped implementations match regular
//! expressions per grammar family and estimate each element's extent by
//! brace matching or indentation; they do not parse. A real incremental
//! parser can be dropped in behind the same trait without touching the
//! builder or anything downstream.

mod body;
mod patterns;

use crate::languages::{Lang, SyntaxFamily};
use crate::node::NodeKind;

pub use patterns::PatternExtractor;

/// One named construct found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedElement {
    pub name: String,
    pub kind: NodeKind,
    /// Byte offset of the first character of the declaration line.
    pub start: usize,
    /// Byte offset one past the end of the element.
    pub end: usize,
    /// 1-based inclusive line range.
    pub line_range: (usize, usize),
}

impl ExtractedElement {
    /// Source slice covered by this element.
    #[must_use]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}

pub trait ElementExtractor: Send + Sync {
    /// Elements in source order. Never fails; unrecognized text yields nothing.
    fn extract(&self, source: &str) -> Vec<ExtractedElement>;
}

/// Extractor for `lang`, or `None` for languages without element support.
#[must_use]
pub fn extractor_for(lang: Lang) -> Option<&'static dyn ElementExtractor> {
    match lang.family() {
        SyntaxFamily::CLike => Some(PatternExtractor::c_like()),
        SyntaxFamily::Go => Some(PatternExtractor::go()),
        SyntaxFamily::Python => Some(PatternExtractor::python()),
        SyntaxFamily::Rust => Some(PatternExtractor::rust()),
        SyntaxFamily::Opaque => None,
    }
}

/// 1-based line number of byte `offset`.
pub(crate) fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
