//! Hybrid retrieval: vector similarity, structural substring matching, and
//! similarity-graph expansion, merged by max-of-weighted-scores fusion.

pub mod engine;
pub mod error;
pub mod fusion;
pub mod request;
pub mod strategy;

pub use engine::{QueryEngine, SearchConfig};
pub use error::{Result, SearchError};
pub use fusion::FusionWeights;
pub use request::{SearchRequest, SearchResult, Strategy};
pub use strategy::Scored;
pub use strategy::graph::GraphParams;
