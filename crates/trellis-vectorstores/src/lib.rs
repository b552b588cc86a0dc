mod in_memory;

pub use in_memory::InMemoryVectorStore;

// Re-export core traits/types for convenient single-import usage.
pub use trellis_core::{Document, Embeddings, TrellisError, VectorStore};
