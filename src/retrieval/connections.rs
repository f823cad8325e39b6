//! Connection expansion
//!
//! The store links chunks with directed edges, but does not guarantee the
//! target of an edge still exists in any collection. Expansion follows
//! edges exactly one hop out from the retrieved set, silently counting
//! dangling targets, and gives expanded records discounted synthetic
//! scores so they sort below direct matches in their category.

use crate::storage::VectorStore;
use crate::types::{Category, ChunkRecord, ResultSet, ScoredChunk};
use std::sync::Arc;
use tracing::debug;

/// Outcome counters for one expansion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Connections whose target was found and added
    pub followed: usize,
    /// Connections whose target exists in no collection
    pub dangling: usize,
    /// Connection fetches that themselves failed
    pub lookup_failures: usize,
}

/// One-hop resolver over stored connections. Never fails: every problem
/// during expansion degrades to a counter and a debug log line.
pub struct ConnectionResolver {
    store: Arc<dyn VectorStore>,
    discount: f32,
}

impl ConnectionResolver {
    pub fn new(store: Arc<dyn VectorStore>, discount: f32) -> Self {
        Self { store, discount }
    }

    /// Expand the result set in place.
    ///
    /// Only chunks present before the call are used as hop origins, which
    /// bounds the traversal to depth one. An expanded record lands in the
    /// category where it was actually found, scored at the originating
    /// score times the discount, clamped to that category's current
    /// minimum so it cannot outrank any direct match.
    pub async fn expand(&self, results: &mut ResultSet) -> ExpansionStats {
        let origins: Vec<(String, f32)> = results
            .iter()
            .flat_map(|(_, items)| {
                items
                    .iter()
                    .map(|e| (e.record.object_id.clone(), e.score))
            })
            .collect();

        let mut stats = ExpansionStats::default();

        for (object_id, origin_score) in origins {
            let connections = match self.store.connections_from(&object_id).await {
                Ok(connections) => connections,
                Err(e) => {
                    stats.lookup_failures += 1;
                    debug!("Connection fetch failed for {}: {}", object_id, e);
                    continue;
                }
            };

            for connection in connections {
                match self.resolve_target(&connection.target_id).await {
                    Some((category, record)) => {
                        if results.contains(category, &record.object_id) {
                            continue;
                        }
                        let mut score = origin_score * self.discount;
                        if let Some(min) = results.min_score(category) {
                            score = score.min(min);
                        }
                        results.merge(category, ScoredChunk { record, score });
                        stats.followed += 1;
                    }
                    None => {
                        stats.dangling += 1;
                        debug!(
                            "Dangling connection {} -> {} ({})",
                            connection.source_id, connection.target_id, connection.relation
                        );
                    }
                }
            }
        }

        stats
    }

    /// Probe each category collection for the target, in canonical order.
    /// A lookup error in one collection is treated the same as not-found
    /// there and the probe continues.
    async fn resolve_target(&self, target_id: &str) -> Option<(Category, ChunkRecord)> {
        for category in Category::ALL {
            match self.store.fetch_by_object_id(category, target_id).await {
                Ok(Some(record)) => return Some((category, record)),
                Ok(None) => continue,
                Err(e) => {
                    debug!("Target lookup failed in {}: {}", category, e);
                    continue;
                }
            }
        }
        None
    }
}
