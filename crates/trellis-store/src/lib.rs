//! In-memory key-value document store.
//!
//! Reference implementation of the `DocStore` trait. Production deployments
//! back the same trait with a persistent store; the retriever only ever
//! calls `mget`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use trellis_core::{Document, TrellisError};

// Re-export the DocStore trait from core (declared there).
pub use trellis_core::DocStore;

/// In-memory document store keyed by id.
pub struct InMemoryDocStore {
    entries: RwLock<HashMap<String, Document>>,
}

impl InMemoryDocStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with (id, document) pairs.
    pub async fn from_entries(entries: Vec<(String, Document)>) -> Result<Self, TrellisError> {
        let store = Self::new();
        store.mset(entries).await?;
        Ok(store)
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryDocStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocStore for InMemoryDocStore {
    async fn mget(&self, ids: &[&str]) -> Result<Vec<Option<Document>>, TrellisError> {
        let entries = self.entries.read().await;
        Ok(ids.iter().map(|id| entries.get(*id).cloned()).collect())
    }

    async fn mset(&self, pairs: Vec<(String, Document)>) -> Result<(), TrellisError> {
        let mut entries = self.entries.write().await;
        for (id, doc) in pairs {
            entries.insert(id, doc);
        }
        Ok(())
    }

    async fn mdelete(&self, ids: &[&str]) -> Result<(), TrellisError> {
        let mut entries = self.entries.write().await;
        for id in ids {
            entries.remove(*id);
        }
        Ok(())
    }

    async fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, TrellisError> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = match prefix {
            Some(p) => entries.keys().filter(|k| k.starts_with(p)).cloned().collect(),
            None => entries.keys().cloned().collect(),
        };
        keys.sort();
        Ok(keys)
    }
}
