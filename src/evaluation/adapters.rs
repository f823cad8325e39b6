//! Retriever adapters
//!
//! Each adapter wraps one retriever variant behind the uniform interface
//! the harness drives. Adapters own their backing retriever, so its store
//! and client handles release when the adapter drops.

use crate::error::Result;
use crate::retrieval::Retriever;
use async_trait::async_trait;

/// Uniform evaluation interface over retriever variants.
#[async_trait]
pub trait RetrieverAdapter: Send + Sync {
    /// Stable name used for report files and the summary table.
    fn name(&self) -> &str;

    /// Retrieve up to `top_k` context texts for a query.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>>;
}

/// Adapter over the main retrieval pipeline.
///
/// Flattens the per-category result set into rendered text lines, best
/// scores first across all categories.
pub struct PipelineAdapter {
    name: String,
    retriever: Retriever,
}

impl PipelineAdapter {
    pub fn new(name: impl Into<String>, retriever: Retriever) -> Self {
        Self {
            name: name.into(),
            retriever,
        }
    }
}

#[async_trait]
impl RetrieverAdapter for PipelineAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        let output = self.retriever.retrieve(query).await?;

        let mut entries: Vec<(f32, String)> = output
            .results
            .iter()
            .flat_map(|(_, items)| items.iter().map(|e| (e.score, e.record.render())))
            .collect();
        entries.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        entries.truncate(top_k);

        Ok(entries.into_iter().map(|(_, text)| text).collect())
    }
}
