//! Trellis — composable retrieval primitives for RAG pipelines.
//!
//! This crate re-exports the Trellis sub-crates for convenient single-import
//! usage. Feature flags control which modules are available.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `embeddings`, `store`, `vectorstores`, `retrieval` |
//! | `embeddings` | `FakeEmbeddings` deterministic provider |
//! | `store` | `InMemoryDocStore` key-value document store |
//! | `vectorstores` | `InMemoryVectorStore` cosine-similarity index |
//! | `retrieval` | `MultiVectorRetriever` and search-type dispatch |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use trellis::core::{DocStore, Document, Retriever, VectorStore};
//! use trellis::retrieval::{MultiVectorRetriever, SearchKwargs, SearchType};
//! ```

/// Core types and traits: Document, TrellisError, Embeddings, VectorStore,
/// DocStore, Retriever. Always available.
pub use trellis_core as core;

/// Embedding providers: Embeddings trait re-export, FakeEmbeddings.
#[cfg(feature = "embeddings")]
pub use trellis_embeddings as embeddings;

/// Key-value document storage: DocStore trait re-export, InMemoryDocStore.
#[cfg(feature = "store")]
pub use trellis_store as store;

/// Vector index backends: InMemoryVectorStore.
#[cfg(feature = "vectorstores")]
pub use trellis_vectorstores as vectorstores;

/// Retrieval: MultiVectorRetriever, SearchType, SearchKwargs.
#[cfg(feature = "retrieval")]
pub use trellis_retrieval as retrieval;
