use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use trellis_core::{DocStore, Document, Embeddings, Retriever, TrellisError, VectorStore};

/// Default metadata key linking a vector index hit to its document store entry.
pub const DEFAULT_ID_KEY: &str = "doc_id";

/// Which vector index operation `MultiVectorRetriever` invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchType {
    /// Plain top-k similarity search.
    #[default]
    Similarity,
    /// Scored search filtered by `SearchKwargs::score_threshold` (inclusive).
    SimilarityScoreThreshold,
    /// Maximal-marginal-relevance search balancing relevance and diversity.
    Mmr,
}

/// Extra parameters forwarded to the chosen search operation.
#[derive(Debug, Clone)]
pub struct SearchKwargs {
    /// Number of candidates to request from the vector index.
    pub k: usize,
    /// Minimum similarity score, required for threshold search. Results
    /// scoring below the threshold are excluded; equal scores are kept.
    pub score_threshold: Option<f32>,
    /// MMR candidate pool size.
    pub fetch_k: usize,
    /// MMR relevance/diversity trade-off (1.0 = pure relevance).
    pub lambda_mult: f32,
}

impl Default for SearchKwargs {
    fn default() -> Self {
        Self {
            k: 4,
            score_threshold: None,
            fetch_k: 20,
            lambda_mult: 0.5,
        }
    }
}

/// A retriever that maps vector index hits back to canonical documents.
///
/// The index holds sub-documents (summaries, chunks, alternate phrasings)
/// whose metadata carries the id of a full document in a separate key-value
/// store. Retrieval searches the index, collects the join ids, and resolves
/// them through the store.
///
/// The join is deliberately lossy: hits missing the id field and ids absent
/// from the store are dropped without error. The retriever is a pure read
/// path and never mutates either collaborator.
pub struct MultiVectorRetriever {
    vectorstore: Arc<dyn VectorStore>,
    docstore: Arc<dyn DocStore>,
    embeddings: Arc<dyn Embeddings>,
    /// Metadata key on index hits holding the document store id.
    id_key: String,
    search_type: SearchType,
    search_kwargs: SearchKwargs,
}

impl MultiVectorRetriever {
    /// Create a new `MultiVectorRetriever` with similarity search defaults.
    pub fn new(
        vectorstore: Arc<dyn VectorStore>,
        docstore: Arc<dyn DocStore>,
        embeddings: Arc<dyn Embeddings>,
    ) -> Self {
        Self {
            vectorstore,
            docstore,
            embeddings,
            id_key: DEFAULT_ID_KEY.to_string(),
            search_type: SearchType::default(),
            search_kwargs: SearchKwargs::default(),
        }
    }

    /// Set a custom metadata key for the join id. Defaults to `"doc_id"`.
    pub fn with_id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    /// Select which vector index operation to invoke.
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Override the parameters forwarded to the search operation.
    pub fn with_search_kwargs(mut self, kwargs: SearchKwargs) -> Self {
        self.search_kwargs = kwargs;
        self
    }

    /// Blocking variant of [`Retriever::retrieve`].
    ///
    /// Drives the async path to completion on a throwaway current-thread
    /// runtime and returns the identical result sequence. Must not be called
    /// from inside an async runtime; use `retrieve` there instead.
    pub fn retrieve_sync(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<Document>, TrellisError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TrellisError::Retriever(e.to_string()))?;
        runtime.block_on(self.retrieve(query, top_k))
    }

    /// Run the configured search operation against the vector index.
    ///
    /// Parameter problems (a threshold search without a threshold) surface
    /// here as config errors; construction never validates.
    async fn search_candidates(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Document>, TrellisError> {
        match self.search_type {
            SearchType::Similarity => {
                self.vectorstore
                    .similarity_search(query, k, self.embeddings.as_ref())
                    .await
            }
            SearchType::SimilarityScoreThreshold => {
                let threshold = self.search_kwargs.score_threshold.ok_or_else(|| {
                    TrellisError::Config(
                        "similarity score threshold search requires search_kwargs.score_threshold"
                            .to_string(),
                    )
                })?;
                let scored = self
                    .vectorstore
                    .similarity_search_with_score(query, k, self.embeddings.as_ref())
                    .await?;
                Ok(scored
                    .into_iter()
                    .filter(|(_, score)| *score >= threshold)
                    .map(|(doc, _)| doc)
                    .collect())
            }
            SearchType::Mmr => {
                self.vectorstore
                    .max_marginal_relevance_search(
                        query,
                        k,
                        self.search_kwargs.fetch_k,
                        self.search_kwargs.lambda_mult,
                        self.embeddings.as_ref(),
                    )
                    .await
            }
        }
    }
}

#[async_trait]
impl Retriever for MultiVectorRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Document>, TrellisError> {
        let k = if top_k > 0 { top_k } else { self.search_kwargs.k };

        let candidates = self.search_candidates(query, k).await?;
        tracing::debug!(
            candidates = candidates.len(),
            search_type = ?self.search_type,
            "vector search complete"
        );

        // Collect join ids, deduplicating in first-seen order. Hits without
        // the id field (or with a non-string value) are skipped.
        let mut seen = HashSet::new();
        let mut ids: Vec<String> = Vec::new();
        for doc in &candidates {
            let Some(id) = doc.metadata_str(&self.id_key) else {
                continue;
            };
            if seen.insert(id.to_string()) {
                ids.push(id.to_string());
            }
        }

        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let fetched = self.docstore.mget(&id_refs).await?;

        // Absent store entries drop out; order follows the dedup sequence.
        let documents: Vec<Document> = fetched.into_iter().flatten().collect();
        tracing::debug!(
            requested = id_refs.len(),
            resolved = documents.len(),
            "docstore join complete"
        );
        Ok(documents)
    }
}
