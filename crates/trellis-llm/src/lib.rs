//! Embedding provider abstraction and backend implementations.
//!
//! Everything that turns text into a comparable vector sits behind
//! [`EmbeddingProvider`]. Storage and ranking only ever see `Vec<f32>`, so a
//! real model backend can replace [`hash::HashEmbedder`] without touching
//! the indexer or the query engine.

pub mod any;
pub mod error;
pub mod hash;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;
pub mod retry;
pub mod similarity;

pub use any::AnyEmbedder;
pub use error::LlmError;
pub use hash::HashEmbedder;
pub use provider::EmbeddingProvider;
pub use retry::{RetryConfig, RetryingEmbedder};
pub use similarity::cosine_similarity;
