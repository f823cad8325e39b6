//! Retrieval evaluation harness
//!
//! Scores retriever variants over a fixed query set and writes one JSON
//! report per retriever.
//!
//! # Architecture
//!
//! - **Adapters**: retrievers behind a uniform `retrieve(query, top_k)`
//!   interface ([`adapters`])
//! - **Metrics**: the relevance-scoring seam with an LLM-judged default
//!   implementation ([`metrics`])
//! - **Harness**: drives adapters over queries, degrades failures to
//!   zero-valued metrics, persists and summarizes reports ([`harness`])
//!
//! # Failure containment
//!
//! A query that errors is skipped for that adapter, not the batch; a
//! metric that cannot produce a score records 0.0 for that retriever and
//! the run continues. Scores are read only through the typed
//! [`metrics::RelevanceMetric`] accessor; there is no fallback parsing of
//! stringified results.

pub mod adapters;
pub mod harness;
pub mod metrics;

pub use adapters::{PipelineAdapter, RetrieverAdapter};
pub use harness::{EvaluationReport, RetrievalEvaluator};
pub use metrics::{EvalSample, LlmContextRelevance, RelevanceMetric};
