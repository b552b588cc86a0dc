use std::collections::HashMap;

use trellis_embeddings::FakeEmbeddings;
use trellis_vectorstores::{Document, Embeddings, InMemoryVectorStore, VectorStore};

#[tokio::test]
async fn add_and_search() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(32);

    let docs = vec![
        Document::new("1", "The cat sat on the mat"),
        Document::new("2", "The dog played in the park"),
        Document::new("3", "A fish swam in the ocean"),
    ];

    let ids = index.add_documents(docs, &embeddings).await.unwrap();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let results = index
        .similarity_search("cat on mat", 2, &embeddings)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "1", "closest doc should rank first");
}

#[tokio::test]
async fn scored_search_sorted_descending() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    index
        .add_documents(
            vec![
                Document::new("a", "hello world"),
                Document::new("b", "goodbye world"),
            ],
            &embeddings,
        )
        .await
        .unwrap();

    let scored = index
        .similarity_search_with_score("hello world", 2, &embeddings)
        .await
        .unwrap();

    assert_eq!(scored.len(), 2);
    assert!(scored[0].1 >= scored[1].1);
    assert!(scored[0].1 > 0.9, "exact match score: {}", scored[0].1);
}

#[tokio::test]
async fn empty_index_returns_empty() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    let results = index
        .similarity_search("anything", 5, &embeddings)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn delete_multiple_ids_at_once() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    index
        .add_documents(
            vec![
                Document::new("1", "one"),
                Document::new("2", "two"),
                Document::new("3", "three"),
            ],
            &embeddings,
        )
        .await
        .unwrap();

    index.delete(&["1", "3"]).await.unwrap();

    let results = index
        .similarity_search("anything", 10, &embeddings)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "2");
}

#[tokio::test]
async fn delete_removes_entries() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    index
        .add_documents(
            vec![Document::new("1", "first"), Document::new("2", "second")],
            &embeddings,
        )
        .await
        .unwrap();

    index.delete(&["1"]).await.unwrap();

    let results = index
        .similarity_search("first", 10, &embeddings)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "2");
}

#[tokio::test]
async fn preserves_metadata() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    let mut metadata = HashMap::new();
    metadata.insert(
        "source".to_string(),
        serde_json::Value::String("test.txt".to_string()),
    );

    index
        .add_documents(
            vec![Document::with_metadata("1", "content", metadata)],
            &embeddings,
        )
        .await
        .unwrap();

    let results = index
        .similarity_search("content", 1, &embeddings)
        .await
        .unwrap();
    assert_eq!(results[0].metadata.get("source").unwrap(), "test.txt");
}

// --- MMR search ---

#[tokio::test]
async fn mmr_returns_k_results() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    let docs = vec![
        Document::new("1", "The cat sat on the mat"),
        Document::new("2", "The cat played with yarn"),
        Document::new("3", "The dog ran in the park"),
        Document::new("4", "A fish swam in the ocean"),
    ];

    index.add_documents(docs, &embeddings).await.unwrap();

    let results = index
        .max_marginal_relevance_search("cat", 2, 4, 0.5, &embeddings)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn mmr_pure_relevance_matches_similarity_top_hit() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(32);

    let docs = vec![
        Document::new("cat1", "The cat sat on the mat"),
        Document::new("cat2", "The cat played with the string"),
        Document::new("cat3", "The cat slept on the couch"),
        Document::new("dog1", "The dog ran in the park"),
    ];

    index.add_documents(docs, &embeddings).await.unwrap();

    let pure_relevance = index
        .max_marginal_relevance_search("cat on mat", 2, 4, 1.0, &embeddings)
        .await
        .unwrap();
    let diverse = index
        .max_marginal_relevance_search("cat on mat", 2, 4, 0.0, &embeddings)
        .await
        .unwrap();
    let standard = index
        .similarity_search("cat on mat", 1, &embeddings)
        .await
        .unwrap();

    assert_eq!(pure_relevance[0].id, standard[0].id);

    let diverse_ids: Vec<&str> = diverse.iter().map(|d| d.id.as_str()).collect();
    let relevance_ids: Vec<&str> = pure_relevance.iter().map(|d| d.id.as_str()).collect();
    assert_ne!(
        diverse_ids, relevance_ids,
        "max diversity should pick a different tail than pure relevance"
    );
}

#[tokio::test]
async fn mmr_fetch_k_caps_candidates() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    let docs = vec![
        Document::new("1", "alpha one"),
        Document::new("2", "alpha two"),
        Document::new("3", "alpha three"),
        Document::new("4", "alpha four"),
    ];

    index.add_documents(docs, &embeddings).await.unwrap();

    // fetch_k=2 leaves only 2 candidates even though k=4
    let results = index
        .max_marginal_relevance_search("alpha", 4, 2, 0.5, &embeddings)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn mmr_k_zero_returns_empty() {
    let index = InMemoryVectorStore::new();
    let embeddings = FakeEmbeddings::new(4);

    index
        .add_documents(vec![Document::new("1", "hello")], &embeddings)
        .await
        .unwrap();

    let results = index
        .max_marginal_relevance_search("hello", 0, 10, 0.5, &embeddings)
        .await
        .unwrap();
    assert!(results.is_empty());
}

// --- from_documents ---

#[tokio::test]
async fn from_documents_populates_index() {
    let embeddings = FakeEmbeddings::new(16);

    let docs = vec![
        Document::new("a", "hello world greeting salutation"),
        Document::new("b", "goodbye farewell departure leaving"),
    ];

    let index = InMemoryVectorStore::from_documents(docs, &embeddings)
        .await
        .unwrap();

    let results = index
        .similarity_search("hello world greeting salutation", 2, &embeddings)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "a", "exact match should be first");
}

// --- embedding count guard ---

struct MiscountingEmbeddings;

#[async_trait::async_trait]
impl Embeddings for MiscountingEmbeddings {
    async fn embed_documents(
        &self,
        texts: &[&str],
    ) -> Result<Vec<Vec<f32>>, trellis_vectorstores::TrellisError> {
        // Drops one vector, simulating a broken provider.
        Ok(vec![vec![0.0; 4]; texts.len().saturating_sub(1)])
    }

    async fn embed_query(
        &self,
        _text: &str,
    ) -> Result<Vec<f32>, trellis_vectorstores::TrellisError> {
        Ok(vec![0.0; 4])
    }
}

#[tokio::test]
async fn add_documents_rejects_embedding_count_mismatch() {
    let index = InMemoryVectorStore::new();
    let err = index
        .add_documents(
            vec![Document::new("1", "one"), Document::new("2", "two")],
            &MiscountingEmbeddings,
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("mismatch"), "got: {err}");
}

// --- default trait MMR ---

struct NoMmrStore;

#[async_trait::async_trait]
impl VectorStore for NoMmrStore {
    async fn add_documents(
        &self,
        _docs: Vec<Document>,
        _embeddings: &dyn Embeddings,
    ) -> Result<Vec<String>, trellis_vectorstores::TrellisError> {
        Ok(Vec::new())
    }

    async fn similarity_search(
        &self,
        _query: &str,
        _k: usize,
        _embeddings: &dyn Embeddings,
    ) -> Result<Vec<Document>, trellis_vectorstores::TrellisError> {
        Ok(Vec::new())
    }

    async fn similarity_search_with_score(
        &self,
        _query: &str,
        _k: usize,
        _embeddings: &dyn Embeddings,
    ) -> Result<Vec<(Document, f32)>, trellis_vectorstores::TrellisError> {
        Ok(Vec::new())
    }

    async fn delete(
        &self,
        _ids: &[&str],
    ) -> Result<(), trellis_vectorstores::TrellisError> {
        Ok(())
    }
}

#[tokio::test]
async fn backends_without_mmr_report_an_error() {
    let store = NoMmrStore;
    let embeddings = FakeEmbeddings::default();
    let err = store
        .max_marginal_relevance_search("q", 2, 10, 0.5, &embeddings)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not supported"));
}
