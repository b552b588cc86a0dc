use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use trellis_core::{Document, Embeddings, TrellisError, VectorStore};

/// In-memory vector index using cosine similarity.
///
/// Reference backend for tests and small corpora; entries live in a
/// `RwLock`-guarded map keyed by document id.
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, IndexedDoc>>,
}

struct IndexedDoc {
    document: Document,
    vector: Vec<f32>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create an index pre-populated with documents.
    pub async fn from_documents(
        documents: Vec<Document>,
        embeddings: &dyn Embeddings,
    ) -> Result<Self, TrellisError> {
        let index = Self::new();
        index.add_documents(documents, embeddings).await?;
        Ok(index)
    }

    /// Score every entry against the query vector, sorted descending.
    async fn scored_candidates(&self, query_vec: &[f32]) -> Vec<(Document, Vec<f32>, f32)> {
        let entries = self.entries.read().await;
        let mut scored: Vec<(Document, Vec<f32>, f32)> = entries
            .values()
            .map(|entry| {
                let score = cosine_similarity(query_vec, &entry.vector);
                (entry.document.clone(), entry.vector.clone(), score)
            })
            .collect();
        scored.sort_unstable_by(|a, b| b.2.total_cmp(&a.2));
        scored
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(
        &self,
        docs: Vec<Document>,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<String>, TrellisError> {
        let texts: Vec<&str> = docs.iter().map(|d| d.content.as_str()).collect();
        let vectors = embeddings.embed_documents(&texts).await?;
        if vectors.len() != docs.len() {
            return Err(TrellisError::VectorStore(format!(
                "embedding count mismatch: {} documents, {} vectors",
                docs.len(),
                vectors.len()
            )));
        }

        let ids: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        let mut entries = self.entries.write().await;
        entries.extend(
            docs.into_iter()
                .zip(vectors)
                .map(|(document, vector)| (document.id.clone(), IndexedDoc { document, vector })),
        );
        Ok(ids)
    }

    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<Document>, TrellisError> {
        let scored = self
            .similarity_search_with_score(query, k, embeddings)
            .await?;
        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<(Document, f32)>, TrellisError> {
        let query_vec = embeddings.embed_query(query).await?;
        Ok(self
            .scored_candidates(&query_vec)
            .await
            .into_iter()
            .take(k)
            .map(|(doc, _vec, score)| (doc, score))
            .collect())
    }

    /// Greedy maximal-marginal-relevance selection.
    ///
    /// `lambda_mult` trades relevance against diversity: 1.0 is pure
    /// relevance, 0.0 is maximum diversity. `fetch_k` caps the candidate
    /// pool scored before selection. Ties keep the more relevant candidate.
    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
        embeddings: &dyn Embeddings,
    ) -> Result<Vec<Document>, TrellisError> {
        let query_vec = embeddings.embed_query(query).await?;
        let mut pool = self.scored_candidates(&query_vec).await;
        pool.truncate(fetch_k);

        let mut picked: Vec<(Document, Vec<f32>)> = Vec::with_capacity(k.min(pool.len()));
        while picked.len() < k && !pool.is_empty() {
            let mut best: Option<(usize, f32)> = None;
            for (i, (_doc, vec, relevance)) in pool.iter().enumerate() {
                let redundancy = picked
                    .iter()
                    .map(|(_, sel_vec)| cosine_similarity(sel_vec, vec))
                    .fold(0.0f32, f32::max);
                let marginal = lambda_mult * relevance - (1.0 - lambda_mult) * redundancy;
                if best.map_or(true, |(_, score)| marginal > score) {
                    best = Some((i, marginal));
                }
            }

            let Some((i, _)) = best else { break };
            let (doc, vec, _relevance) = pool.remove(i);
            picked.push((doc, vec));
        }

        Ok(picked.into_iter().map(|(doc, _)| doc).collect())
    }

    async fn delete(&self, ids: &[&str]) -> Result<(), TrellisError> {
        let mut entries = self.entries.write().await;
        entries.retain(|id, _| !ids.contains(&id.as_str()));
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
