//! Common test utilities and helpers
//!
//! Stub implementations of the store, generator, and rewriter seams so the
//! retrieval pipeline and evaluation harness can be exercised without a
//! running vector database or LLM endpoint.

#![allow(dead_code)]

use anamnesis_core::{
    error::{AnamnesisError, Result},
    Category, ChunkBody, ChunkRecord, Connection, LabelKind, QueryRewritePolicy, RewrittenQuery,
    ScoredChunk, TextGenerator, VectorStore,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// In-memory store stub.
///
/// Searches answer from `query_results` when an exact (category, query)
/// entry exists, falling back to the per-category default; categories in
/// `failing` error on every search.
#[derive(Default)]
pub struct StubStore {
    pub search_results: HashMap<Category, Vec<ScoredChunk>>,
    pub query_results: HashMap<(Category, String), Vec<ScoredChunk>>,
    pub failing: HashSet<Category>,
    pub records: HashMap<(Category, String), ChunkRecord>,
    pub connections: Vec<Connection>,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, category: Category, chunk: ScoredChunk) -> Self {
        self.search_results.entry(category).or_default().push(chunk);
        self
    }

    pub fn with_query_result(
        mut self,
        category: Category,
        query: &str,
        chunk: ScoredChunk,
    ) -> Self {
        self.query_results
            .entry((category, query.to_string()))
            .or_default()
            .push(chunk);
        self
    }

    pub fn with_failure(mut self, category: Category) -> Self {
        self.failing.insert(category);
        self
    }

    pub fn with_record(mut self, category: Category, record: ChunkRecord) -> Self {
        self.records
            .insert((category, record.object_id.clone()), record);
        self
    }

    pub fn with_connection(mut self, source: &str, target: &str, relation: &str) -> Self {
        self.connections.push(Connection {
            source_id: source.to_string(),
            target_id: target.to_string(),
            relation: relation.to_string(),
        });
        self
    }
}

#[async_trait]
impl VectorStore for StubStore {
    async fn similarity_search(
        &self,
        category: Category,
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if self.failing.contains(&category) {
            return Err(AnamnesisError::Search {
                category: category.to_string(),
                message: "stub search failure".to_string(),
            });
        }

        let hits = self
            .query_results
            .get(&(category, query_text.to_string()))
            .or_else(|| self.search_results.get(&category))
            .cloned()
            .unwrap_or_default();
        Ok(hits.into_iter().take(limit).collect())
    }

    async fn fetch_by_object_id(
        &self,
        category: Category,
        object_id: &str,
    ) -> Result<Option<ChunkRecord>> {
        Ok(self.records.get(&(category, object_id.to_string())).cloned())
    }

    async fn connections_from(&self, source_id: &str) -> Result<Vec<Connection>> {
        Ok(self
            .connections
            .iter()
            .filter(|c| c.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn list_connections(&self, limit: usize) -> Result<Vec<Connection>> {
        Ok(self.connections.iter().take(limit).cloned().collect())
    }
}

/// Generator stub behaviors.
pub enum StubResponse {
    /// Always return this text
    Fixed(String),
    /// Echo the prompt length, proving the prompt reached the generator
    EchoLen,
    /// Always fail
    Fail,
}

pub struct StubGenerator {
    pub response: StubResponse,
}

impl StubGenerator {
    pub fn fixed(text: &str) -> Self {
        Self {
            response: StubResponse::Fixed(text.to_string()),
        }
    }

    pub fn echo_len() -> Self {
        Self {
            response: StubResponse::EchoLen,
        }
    }

    pub fn failing() -> Self {
        Self {
            response: StubResponse::Fail,
        }
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match &self.response {
            StubResponse::Fixed(text) => Ok(text.clone()),
            StubResponse::EchoLen => Ok(format!("prompt length: {}", prompt.len())),
            StubResponse::Fail => Err(AnamnesisError::Generation(
                "stub generator failure".to_string(),
            )),
        }
    }
}

/// Rewriter stub with a canned fan-out, or a forced failure.
pub struct StubRewriter {
    pub rewrites: Vec<RewrittenQuery>,
    pub fail: bool,
}

impl StubRewriter {
    pub fn with_rewrites(rewrites: Vec<(&str, Category)>) -> Self {
        Self {
            rewrites: rewrites
                .into_iter()
                .map(|(text, category)| RewrittenQuery {
                    text: text.to_string(),
                    category,
                })
                .collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            rewrites: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl QueryRewritePolicy for StubRewriter {
    async fn rewrite(&self, _query: &str) -> Result<Vec<RewrittenQuery>> {
        if self.fail {
            return Err(AnamnesisError::Rewrite("stub rewrite failure".to_string()));
        }
        Ok(self.rewrites.clone())
    }
}

/// A chunk with title/description fields.
pub fn titled_chunk(id: &str, title: &str, description: &str, score: f32) -> ScoredChunk {
    ScoredChunk {
        record: ChunkRecord {
            object_id: id.to_string(),
            body: ChunkBody::Labeled {
                kind: LabelKind::Title,
                label: title.to_string(),
                description: description.to_string(),
            },
            metadata: serde_json::Value::Null,
        },
        score,
    }
}

/// A chunk with name/description fields.
pub fn named_chunk(id: &str, name: &str, description: &str, score: f32) -> ScoredChunk {
    ScoredChunk {
        record: ChunkRecord {
            object_id: id.to_string(),
            body: ChunkBody::Labeled {
                kind: LabelKind::Name,
                label: name.to_string(),
                description: description.to_string(),
            },
            metadata: serde_json::Value::Null,
        },
        score,
    }
}

/// A chunk with a bare content field.
pub fn content_chunk(id: &str, content: &str, score: f32) -> ScoredChunk {
    ScoredChunk {
        record: ChunkRecord {
            object_id: id.to_string(),
            body: ChunkBody::Content {
                content: content.to_string(),
            },
            metadata: serde_json::Value::Null,
        },
        score,
    }
}
