mod multi_vector;

pub use multi_vector::{MultiVectorRetriever, SearchKwargs, SearchType, DEFAULT_ID_KEY};

// Re-export core traits/types for convenient single-import usage.
pub use trellis_core::{DocStore, Document, Embeddings, Retriever, TrellisError, VectorStore};
