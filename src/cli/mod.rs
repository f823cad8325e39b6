//! CLI command handlers
//!
//! Each subcommand is implemented in its own module. The shared builders
//! here acquire the session-scoped resources (store connection, LLM
//! client); acquisition failure is the one fatal error class and is
//! surfaced to the user as a plain diagnostic by the binary.

pub mod chat;
pub mod diagnose;
pub mod evaluate;

use crate::config::AnamnesisConfig;
use crate::error::Result;
use crate::retrieval::{LlmQueryRewriter, Retriever};
use crate::services::{AnthropicGenerator, EmbeddingService, TextGenerator};
use crate::storage::{QdrantStore, VectorStore};
use std::sync::Arc;

/// Open the store connection and LLM client for one session.
pub(crate) async fn build_components(
    config: &AnamnesisConfig,
) -> Result<(Arc<dyn VectorStore>, Arc<dyn TextGenerator>)> {
    let store = QdrantStore::connect(&config.store.url, EmbeddingService::default()).await?;
    let generator = AnthropicGenerator::new(config.llm.clone())?;
    Ok((Arc::new(store), Arc::new(generator)))
}

/// Assemble the default retriever: LLM rewriting over the given store.
pub(crate) fn build_retriever(
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn TextGenerator>,
    config: &AnamnesisConfig,
) -> Retriever {
    let rewriter = Arc::new(LlmQueryRewriter::new(
        generator,
        config.retrieval.max_rewrites,
    ));
    Retriever::new(store, rewriter, config.retrieval.clone())
}
