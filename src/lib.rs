//! Anamnesis - Semantic Diary Analysis
//!
//! A retrieval-grounded assistant over a personal diary stored as
//! categorized text chunks in a vector database:
//! - Query rewriting fans one question out into category-targeted searches
//! - Per-category retrieval with dedup, score ordering, and a global cap
//! - One-hop expansion along stored (possibly dangling) connections
//! - Prompt-ready context formatting and LLM answer generation
//! - An evaluation harness scoring retriever variants
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (Category, ChunkRecord, ResultSet)
//! - **Storage**: The vector store seam and its Qdrant client
//! - **Services**: LLM integration, query embedding
//! - **Retrieval**: The rewrite/search/expand/format pipeline
//! - **Evaluation**: Retriever adapters, metrics, and the harness
//!
//! # Example
//!
//! ```ignore
//! use anamnesis_core::{ChatSession, Retriever};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = anamnesis_core::AnamnesisConfig::load(None)?;
//!     let session = ChatSession::new(retriever, generator);
//!
//!     let answer = session.chat("What gifts did Anne receive?").await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod retrieval;
pub mod services;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use chat::ChatSession;
pub use config::{AnamnesisConfig, LlmConfig, RetrievalConfig, RewriteFallback};
pub use error::{AnamnesisError, Result};
pub use retrieval::{
    format_results, LlmQueryRewriter, PassthroughRewriter, QueryRewritePolicy, Retriever,
    NO_INFORMATION_FOUND,
};
pub use services::{AnthropicGenerator, EmbeddingService, TextGenerator};
pub use storage::{QdrantStore, VectorStore};
pub use types::{
    Category, ChunkBody, ChunkRecord, Connection, LabelKind, ResultSet, RetrievalOutput,
    RewrittenQuery, ScoredChunk,
};
