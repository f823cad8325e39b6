//! Storage layer for Anamnesis
//!
//! Provides the vector store seam consumed by the retrieval core, and its
//! Qdrant client implementation. The core only ever reads: one collection
//! per chunk category plus a `Connection` collection of directed edges.

pub mod qdrant;

pub use qdrant::QdrantStore;

use crate::error::Result;
use crate::types::{Category, ChunkRecord, Connection, ScoredChunk};
use async_trait::async_trait;

/// Read-only interface to the categorized chunk store.
///
/// Every operation is fallible; the retrieval core converts failures into
/// empty results for the failing scope rather than propagating them raw.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Similarity search in one category's collection. Results arrive
    /// ordered descending by score; ties are unspecified.
    async fn similarity_search(
        &self,
        category: Category,
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Fetch a single chunk by its stable identifier, if the category's
    /// collection holds it.
    async fn fetch_by_object_id(
        &self,
        category: Category,
        object_id: &str,
    ) -> Result<Option<ChunkRecord>>;

    /// Outgoing connections of one chunk.
    async fn connections_from(&self, source_id: &str) -> Result<Vec<Connection>>;

    /// Sample of stored connections, for diagnostics.
    async fn list_connections(&self, limit: usize) -> Result<Vec<Connection>>;
}
