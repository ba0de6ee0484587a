//! Vector storage.
//!
//! - [`vectorstore`] - the [`VectorStore`] backend trait, provider selection
//!   and the in-memory store
//! - [`qdrant`] - Qdrant backend (feature `qdrant`)
//! - [`filter`] - exact-match metadata filters
//! - [`index`] - the collection-scoped [`VectorIndex`] the pipeline uses
//!
//! Enable backends via Cargo features:
//! ```toml
//! ragline = { version = "*", features = ["qdrant"] }
//! ```

#![allow(missing_docs)]

pub mod filter;
pub mod index;
pub mod vectorstore;

#[cfg(feature = "qdrant")]
pub mod qdrant;

// Re-exports
pub use filter::MetadataFilter;
pub use index::{PointIdStrategy, VectorIndex};
pub use vectorstore::{DistanceMetric, InMemoryVectorStore, VectorStore, VectorStoreProvider};

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
