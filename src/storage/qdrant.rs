//! Qdrant-backed vector store client
//!
//! One collection per chunk category (`ChunkEvent`, `ChunkPerson`, ...)
//! plus a `Connection` collection of directed edges. Query text is embedded
//! locally before searching; chunk payloads are decoded into [`ChunkRecord`]
//! values and records without a usable payload are skipped, not errored.

use crate::error::{AnamnesisError, Result};
use crate::services::EmbeddingService;
use crate::storage::VectorStore;
use crate::types::{Category, ChunkRecord, Connection, ScoredChunk};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    value::Kind, Condition, Filter, ScrollPointsBuilder, SearchPointsBuilder,
    Value as QdrantValue,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Collection holding chunk-to-chunk edges
const CONNECTION_COLLECTION: &str = "Connection";

/// Upper bound on edges fetched per chunk during expansion
const MAX_CONNECTIONS_PER_CHUNK: usize = 32;

/// Qdrant client wrapper implementing [`VectorStore`]
pub struct QdrantStore {
    client: Qdrant,
    embedder: EmbeddingService,
}

impl QdrantStore {
    /// Connect to Qdrant and verify the endpoint is reachable.
    ///
    /// An unreachable store is the fatal startup case; callers surface the
    /// error as a plain diagnostic and abort the session.
    pub async fn connect(url: &str, embedder: EmbeddingService) -> Result<Self> {
        info!("Connecting to vector store at {}", url);

        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| AnamnesisError::Store(format!("failed to create client: {}", e)))?;

        client.health_check().await.map_err(|e| {
            AnamnesisError::Store(format!("vector store unreachable at {}: {}", url, e))
        })?;

        Ok(Self { client, embedder })
    }

    fn decode_chunk(payload: HashMap<String, QdrantValue>) -> Option<ChunkRecord> {
        let json = payload_to_json(payload);
        let record = ChunkRecord::from_json(json);
        if record.is_none() {
            debug!("Skipping point without usable object_id");
        }
        record
    }

    fn decode_connection(payload: HashMap<String, QdrantValue>) -> Option<Connection> {
        let json = payload_to_json(payload);
        match serde_json::from_value::<Connection>(json) {
            Ok(conn) => Some(conn),
            Err(e) => {
                debug!("Skipping malformed connection record: {}", e);
                None
            }
        }
    }

    async fn scroll_connections(&self, filter: Option<Filter>, limit: usize) -> Result<Vec<Connection>> {
        let mut request = ScrollPointsBuilder::new(CONNECTION_COLLECTION)
            .limit(limit as u32)
            .with_payload(true);
        if let Some(filter) = filter {
            request = request.filter(filter);
        }

        let response = self
            .client
            .scroll(request)
            .await
            .map_err(|e| AnamnesisError::Store(format!("connection scroll failed: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| Self::decode_connection(point.payload))
            .collect())
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn similarity_search(
        &self,
        category: Category,
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let vector = self.embedder.embed(query_text);

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(category.collection_name(), vector, limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| AnamnesisError::Search {
                category: category.to_string(),
                message: e.to_string(),
            })?;

        let mut results = Vec::with_capacity(response.result.len());
        for point in response.result {
            if let Some(record) = Self::decode_chunk(point.payload) {
                results.push(ScoredChunk {
                    record,
                    score: point.score,
                });
            }
        }

        debug!(
            "{}: {} hits for '{}'",
            category.collection_name(),
            results.len(),
            query_text
        );
        Ok(results)
    }

    async fn fetch_by_object_id(
        &self,
        category: Category,
        object_id: &str,
    ) -> Result<Option<ChunkRecord>> {
        let filter = Filter::must([Condition::matches("object_id", object_id.to_string())]);

        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(category.collection_name())
                    .filter(filter)
                    .limit(1)
                    .with_payload(true),
            )
            .await
            .map_err(|e| AnamnesisError::Store(format!("fetch failed: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .next()
            .and_then(|point| Self::decode_chunk(point.payload)))
    }

    async fn connections_from(&self, source_id: &str) -> Result<Vec<Connection>> {
        let filter = Filter::must([Condition::matches("source_id", source_id.to_string())]);
        self.scroll_connections(Some(filter), MAX_CONNECTIONS_PER_CHUNK)
            .await
    }

    async fn list_connections(&self, limit: usize) -> Result<Vec<Connection>> {
        match self.scroll_connections(None, limit).await {
            Ok(connections) => Ok(connections),
            Err(e) => {
                warn!("Could not list connections: {}", e);
                Err(e)
            }
        }
    }
}

/// Convert a Qdrant payload into a JSON object the type layer understands.
fn payload_to_json(payload: HashMap<String, QdrantValue>) -> serde_json::Value {
    serde_json::Value::Object(
        payload
            .into_iter()
            .map(|(k, v)| (k, qdrant_value_to_json(v)))
            .collect(),
    )
}

fn qdrant_value_to_json(value: QdrantValue) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Value::from(d),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(qdrant_value_to_json).collect(),
        ),
        Some(Kind::StructValue(fields)) => serde_json::Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}
