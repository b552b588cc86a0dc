//! Core types and traits for the Trellis retrieval pipeline.
//!
//! The collaborator traits (`Embeddings`, `VectorStore`, `DocStore`) are
//! declared here and implemented in sibling crates, so that retrievers can
//! depend on the interfaces without pulling in any concrete backend.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for the Trellis workspace with variants per subsystem.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("config error: {0}")]
    Config(String),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("vector store error: {0}")]
    VectorStore(String),
    #[error("doc store error: {0}")]
    DocStore(String),
    #[error("retriever error: {0}")]
    Retriever(String),
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document with content and metadata, used throughout the retrieval pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: HashMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }

    /// Read a metadata field as a string, if present and a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Embeddings trait (implemented in trellis-embeddings and provider crates)
// ---------------------------------------------------------------------------

/// Trait for embedding text into vectors.
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Embed multiple texts (for batch document embedding).
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, TrellisError>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, TrellisError>;
}

// ---------------------------------------------------------------------------
// Retriever trait
// ---------------------------------------------------------------------------

/// Trait for retrieving relevant documents given a query string.
///
/// `top_k` overrides the retriever's configured result count when positive;
/// pass `0` to use the configured default.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, TrellisError>;
}

// ---------------------------------------------------------------------------
// VectorStore trait (implemented in trellis-vectorstores and backend crates)
// ---------------------------------------------------------------------------

/// Trait for vector index backends.
///
/// Backends own their entries entirely: retrievers only ever call the search
/// methods, while setup code uses `add_documents` / `delete`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add documents to the index under their explicit ids, computing embeddings.
    async fn add_documents(
        &self,
        docs: Vec<Document>,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<String>, TrellisError>;

    /// Top-k similarity search by query string.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<Document>, TrellisError>;

    /// Search with similarity scores (higher = more similar).
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<(Document, f32)>, TrellisError>;

    /// Maximal-marginal-relevance search balancing relevance and diversity.
    ///
    /// Optional capability: backends that do not support MMR keep the default
    /// body, which reports a vector store error.
    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<Document>, TrellisError> {
        let _ = (query, k, fetch_k, lambda_mult, embeddings);
        Err(TrellisError::VectorStore(
            "max marginal relevance search is not supported by this backend".to_string(),
        ))
    }

    /// Delete documents by id.
    async fn delete(&self, ids: &[&str]) -> Result<(), TrellisError>;
}

// ---------------------------------------------------------------------------
// DocStore trait (implemented in trellis-store and backend crates)
// ---------------------------------------------------------------------------

/// Key-value document store mapping stable ids to full documents.
///
/// The multi-get contract returns one slot per requested id, in request
/// order, with `None` marking absent entries.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// Fetch documents by id.
    async fn mget(&self, ids: &[&str]) -> Result<Vec<Option<Document>>, TrellisError>;

    /// Insert or replace (id, document) pairs.
    async fn mset(&self, entries: Vec<(String, Document)>) -> Result<(), TrellisError>;

    /// Delete entries by id. Missing ids are ignored.
    async fn mdelete(&self, ids: &[&str]) -> Result<(), TrellisError>;

    /// List stored ids, optionally filtered by prefix.
    async fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, TrellisError>;
}
