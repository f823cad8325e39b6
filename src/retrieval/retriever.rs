//! Multi-category retriever
//!
//! Issues one similarity search per rewritten query, merges results per
//! category, and enforces the global result cap. One category's failure
//! never aborts retrieval for the rest.

use crate::config::{RetrievalConfig, RewriteFallback};
use crate::error::Result;
use crate::retrieval::connections::ConnectionResolver;
use crate::retrieval::rewrite::QueryRewritePolicy;
use crate::storage::VectorStore;
use crate::types::{ResultSet, RetrievalOutput, RewrittenQuery};
use std::sync::Arc;
use tracing::{debug, warn};

/// Orchestrates rewrite, per-category search, merge, and expansion.
///
/// Stateless across calls: each `retrieve` builds a fresh [`ResultSet`]
/// and issues its store calls strictly one at a time.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    rewriter: Arc<dyn QueryRewritePolicy>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        rewriter: Arc<dyn QueryRewritePolicy>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            rewriter,
            config,
        }
    }

    /// Run the full retrieval pipeline for one user query.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalOutput> {
        let queries_used = self.rewrite_or_fall_back(query).await?;

        let mut results = ResultSet::new();
        for rewritten in &queries_used {
            // A failed search claims its category slot with zero results
            // and retrieval moves on: partial failure is not total failure.
            results.ensure_category(rewritten.category);
            match self
                .store
                .similarity_search(
                    rewritten.category,
                    &rewritten.text,
                    self.config.per_category_limit,
                )
                .await
            {
                Ok(hits) => {
                    for hit in hits {
                        results.merge(rewritten.category, hit);
                    }
                }
                Err(e) => {
                    warn!(
                        "Search failed for {} ('{}'): {}",
                        rewritten.category, rewritten.text, e
                    );
                }
            }
        }

        results.sort_descending();

        let total = results.total_len();
        if total > self.config.max_total_results {
            debug!(
                "Truncating {} merged results to cap {}",
                total, self.config.max_total_results
            );
            results.truncate_total(self.config.max_total_results);
        }

        if self.config.follow_connections {
            let resolver =
                ConnectionResolver::new(self.store.clone(), self.config.connection_discount);
            let stats = resolver.expand(&mut results).await;
            if stats.dangling > 0 || stats.lookup_failures > 0 {
                debug!(
                    "Connection expansion: {} added, {} dangling, {} lookup failures",
                    stats.followed, stats.dangling, stats.lookup_failures
                );
            }
            results.sort_descending();
        }

        Ok(RetrievalOutput {
            results,
            queries_used,
        })
    }

    async fn rewrite_or_fall_back(&self, query: &str) -> Result<Vec<RewrittenQuery>> {
        match self.rewriter.rewrite(query).await {
            Ok(rewrites) => Ok(rewrites),
            Err(e) => match self.config.rewrite_fallback {
                RewriteFallback::Abort => Err(e),
                RewriteFallback::OriginalAsDefault => {
                    warn!(
                        "Rewrite failed ({}); using original query against {}",
                        e, self.config.default_category
                    );
                    Ok(vec![RewrittenQuery {
                        text: query.to_string(),
                        category: self.config.default_category,
                    }])
                }
            },
        }
    }
}
