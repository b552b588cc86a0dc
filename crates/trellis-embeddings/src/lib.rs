//! Embedding providers for Trellis.
//!
//! Real providers (API-backed) implement the `Embeddings` trait from
//! `trellis-core`; this crate ships the deterministic fake used by tests
//! and by the in-memory vector store examples.

use async_trait::async_trait;

// Re-export the Embeddings trait from core (declared there).
pub use trellis_core::Embeddings;
use trellis_core::TrellisError;

/// Deterministic embeddings for testing.
///
/// Each whitespace token (lowercased) hashes to a fixed pseudo-random
/// direction; a text embeds as the unit-normalized sum of its token
/// directions. Texts sharing tokens land near each other, disjoint texts
/// are near-orthogonal once `dimensions` is large enough.
pub struct FakeEmbeddings {
    dimensions: usize,
}

impl FakeEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for FakeEmbeddings {
    fn default() -> Self {
        Self::new(4)
    }
}

#[async_trait]
impl Embeddings for FakeEmbeddings {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, TrellisError> {
        Ok(texts
            .iter()
            .map(|t| token_vector(t, self.dimensions))
            .collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, TrellisError> {
        Ok(token_vector(text, self.dimensions))
    }
}

fn token_vector(text: &str, dimensions: usize) -> Vec<f32> {
    if dimensions == 0 {
        return Vec::new();
    }

    let mut vec = vec![0.0f32; dimensions];
    for token in text.split_whitespace() {
        let mut state = token_seed(token);
        for slot in vec.iter_mut() {
            state = scramble(state);
            // Top 24 bits mapped onto [-0.5, 0.5).
            *slot += (state >> 40) as f32 / (1u64 << 24) as f32 - 0.5;
        }
    }

    let magnitude = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in &mut vec {
            *x /= magnitude;
        }
    }
    vec
}

/// FNV-1a over the lowercased token bytes.
fn token_seed(token: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in token.bytes() {
        hash ^= byte.to_ascii_lowercase() as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// xorshift step driving the per-dimension stream for one token.
fn scramble(state: u64) -> u64 {
    let mut s = state;
    s ^= s << 13;
    s ^= s >> 7;
    s ^= s << 17;
    s
}
