//! Configuration for Anamnesis
//!
//! Settings are layered: serde defaults, then an optional TOML file
//! (`anamnesis.toml` or a path given on the command line), then
//! `ANAMNESIS_*` environment variables (`__` separates nesting, e.g.
//! `ANAMNESIS_RETRIEVAL__MAX_TOTAL_RESULTS=12`).

use crate::error::Result;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnamnesisConfig {
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub evaluation: EvaluationConfig,
}

/// Vector store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Qdrant endpoint URL
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: env::var("ANAMNESIS_VECTOR_DB_URL")
                .unwrap_or_else(|_| "http://localhost:6334".to_string()),
        }
    }
}

/// Configuration for the LLM service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Model to use
    pub model: String,

    /// Max tokens for responses
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// What to do when query rewriting fails.
///
/// This is an explicit policy decision, never a hidden default: `abort`
/// fails the whole retrieval, `original_as_default` retries with the
/// original query against [`RetrievalConfig::default_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteFallback {
    Abort,
    OriginalAsDefault,
}

/// Retrieval pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Result limit for each (query, category) similarity search
    pub per_category_limit: usize,

    /// Hard cap on merged results across all categories. Guards against
    /// the dilution failure mode of 20+ weak results spread over many
    /// categories.
    pub max_total_results: usize,

    /// Upper bound on rewritten queries per original query
    pub max_rewrites: usize,

    /// Behavior when the rewriter fails
    pub rewrite_fallback: RewriteFallback,

    /// Category used by the `original_as_default` fallback
    pub default_category: Category,

    /// Whether to expand results one hop along stored connections
    pub follow_connections: bool,

    /// Score multiplier for connection-expanded records (must be < 1.0 so
    /// expanded records rank below their originators)
    pub connection_discount: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            per_category_limit: 5,
            max_total_results: 15,
            max_rewrites: 5,
            rewrite_fallback: RewriteFallback::OriginalAsDefault,
            default_category: Category::Event,
            follow_connections: true,
            connection_discount: 0.5,
        }
    }
}

/// Evaluation harness settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// JSON file with evaluation queries (bare array or `{"queries": []}`)
    pub queries_file: String,

    /// Directory for per-retriever result files
    pub output_dir: String,

    /// Documents retrieved per query
    pub top_k: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            queries_file: "evaluation/queries.json".to_string(),
            output_dir: "evaluation/results".to_string(),
            top_k: 5,
        }
    }
}

impl AnamnesisConfig {
    /// Load configuration from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(p) => builder.add_source(config::File::from(p)),
            None => builder.add_source(config::File::with_name("anamnesis").required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix("ANAMNESIS")
                .separator("__")
                .ignore_empty(true),
        );

        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }
}
