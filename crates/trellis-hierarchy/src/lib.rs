//! Directory → file → code-element hierarchy.
//!
//! [`HierarchyBuilder`] walks a source tree depth-first and produces a
//! [`Hierarchy`]: one node per directory, one per recognized source file, and
//! one per function/class/interface found by the pattern-based extractors in
//! [`extract`]. Extraction is heuristic; see [`extract::ElementExtractor`].

pub mod builder;
pub mod error;
pub mod extract;
pub mod hierarchy;
pub mod languages;
pub mod metrics;
pub mod node;

pub use builder::{BuilderConfig, HierarchyBuilder};
pub use error::{HierarchyError, Result};
pub use hierarchy::{Hierarchy, HierarchySummary, NodeMatch};
pub use languages::{Lang, detect_language};
pub use node::{HierarchyNode, NodeId, NodeKind, NodeMetadata};
