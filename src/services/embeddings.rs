//! Query embedding for vector search
//!
//! Produces fixed-size vectors for query text so the store client can run
//! similarity searches. Uses deterministic local feature hashing (word and
//! character n-gram features spread over a fixed dimension); no network
//! call is involved, so embedding a query can never fail a retrieval.
//!
//! The store's chunk vectors are written by the ingestion side with the
//! same scheme; the dimension here must match the collections' schema.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedding dimension shared with the store's collections
pub const EMBEDDING_DIM: usize = 384;

/// Deterministic local embedding service
#[derive(Debug, Clone)]
pub struct EmbeddingService {
    dimensions: usize,
}

impl Default for EmbeddingService {
    fn default() -> Self {
        Self {
            dimensions: EMBEDDING_DIM,
        }
    }
}

impl EmbeddingService {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed text into a normalized fixed-size vector.
    ///
    /// Words weigh more than character trigrams so short queries with
    /// distinctive terms separate cleanly; trigrams keep morphological
    /// variants ("birthday"/"birthdays") close.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered.split_whitespace() {
            let dim = Self::feature_dim(word, self.dimensions);
            embedding[dim] += 2.0;

            let chars: Vec<char> = word.chars().collect();
            for gram in chars.windows(3) {
                let gram: String = gram.iter().collect();
                let dim = Self::feature_dim(&gram, self.dimensions);
                embedding[dim] += 1.0;
            }
        }

        normalize(&mut embedding);
        embedding
    }

    fn feature_dim(feature: &str, dimensions: usize) -> usize {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() as usize) % dimensions
    }
}

fn normalize(v: &mut [f32]) {
    let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in v.iter_mut() {
            *x /= magnitude;
        }
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
