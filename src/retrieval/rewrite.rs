//! Query rewriting policies
//!
//! How a natural-language question maps onto the fixed category set is not
//! a deterministic algorithm, so it lives behind [`QueryRewritePolicy`]:
//! the default implementation delegates to a language model, and a
//! passthrough baseline exists for evaluation and offline use.

use crate::error::{AnamnesisError, Result};
use crate::services::TextGenerator;
use crate::types::{Category, RewrittenQuery};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Expands one user query into category-targeted search queries.
#[async_trait]
pub trait QueryRewritePolicy: Send + Sync {
    /// Produce a non-empty ordered sequence of rewritten queries. The same
    /// category may appear multiple times with different phrasings.
    async fn rewrite(&self, query: &str) -> Result<Vec<RewrittenQuery>>;
}

/// LLM-backed rewriter parsing `REWRITE: <category>, <text>` lines.
pub struct LlmQueryRewriter {
    generator: Arc<dyn TextGenerator>,
    max_rewrites: usize,
}

impl LlmQueryRewriter {
    pub fn new(generator: Arc<dyn TextGenerator>, max_rewrites: usize) -> Self {
        Self {
            generator,
            max_rewrites,
        }
    }

    fn prompt(&self, query: &str) -> String {
        format!(
            r#"You are preparing a question about a personal diary for retrieval from a store of categorized text chunks.

Question: {}

Rewrite the question into up to {} focused search queries, each targeting exactly one of these categories:
Event, Person, Emotion, Thought, Problem, Achievement, FutureIntention

The same category may be used more than once with different phrasings. Prefer fewer, sharper queries over covering every category.

Format your response EXACTLY as (one rewrite per line):
REWRITE: <category>, <search query>
"#,
            query, self.max_rewrites
        )
    }
}

/// Parse rewrite lines, skipping lines whose category is unknown.
fn parse_rewrites(response: &str, max: usize) -> Vec<RewrittenQuery> {
    let mut rewrites = Vec::new();

    for line in response.lines() {
        if rewrites.len() >= max {
            break;
        }
        let Some(rest) = line.trim().strip_prefix("REWRITE:") else {
            continue;
        };
        let Some((category_str, text)) = rest.split_once(',') else {
            continue;
        };
        match Category::from_name(category_str) {
            Some(category) => {
                let text = text.trim();
                if !text.is_empty() {
                    rewrites.push(RewrittenQuery {
                        text: text.to_string(),
                        category,
                    });
                }
            }
            None => {
                debug!("Skipping rewrite with unknown category: {}", category_str.trim());
            }
        }
    }

    rewrites
}

#[async_trait]
impl QueryRewritePolicy for LlmQueryRewriter {
    async fn rewrite(&self, query: &str) -> Result<Vec<RewrittenQuery>> {
        let response = self
            .generator
            .generate(&self.prompt(query))
            .await
            .map_err(|e| AnamnesisError::Rewrite(e.to_string()))?;

        let rewrites = parse_rewrites(&response, self.max_rewrites);
        if rewrites.is_empty() {
            return Err(AnamnesisError::Rewrite(format!(
                "no usable rewrite lines in model response ({} chars)",
                response.len()
            )));
        }

        debug!("Rewrote query into {} targeted queries", rewrites.len());
        Ok(rewrites)
    }
}

/// Deterministic baseline: the original query against each configured
/// category, unchanged. Useful for evaluation comparisons and for running
/// without an LLM.
pub struct PassthroughRewriter {
    categories: Vec<Category>,
}

impl PassthroughRewriter {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Fan the query out across every category.
    pub fn all_categories() -> Self {
        Self::new(Category::ALL.to_vec())
    }
}

#[async_trait]
impl QueryRewritePolicy for PassthroughRewriter {
    async fn rewrite(&self, query: &str) -> Result<Vec<RewrittenQuery>> {
        if self.categories.is_empty() {
            return Err(AnamnesisError::Rewrite(
                "passthrough rewriter has no categories configured".to_string(),
            ));
        }
        Ok(self
            .categories
            .iter()
            .map(|&category| RewrittenQuery {
                text: query.to_string(),
                category,
            })
            .collect())
    }
}
