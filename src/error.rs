//! Error types for the Anamnesis retrieval system
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.
//!
//! Propagation policy: failures local to one category, one connection, or
//! one query in a batch are contained by the caller and never abort the
//! surrounding batch or session. Only total resource acquisition failure
//! (store or LLM unreachable at startup) is fatal.

use thiserror::Error;

/// Main error type for Anamnesis operations
#[derive(Error, Debug)]
pub enum AnamnesisError {
    /// Query rewriting failed; caller decides abort vs. fallback
    #[error("Query rewrite failed: {0}")]
    Rewrite(String),

    /// One category's similarity search failed
    #[error("Search failed for {category}: {message}")]
    Search { category: String, message: String },

    /// Vector store operation failed
    #[error("Vector store error: {0}")]
    Store(String),

    /// Answer generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// LLM API request failed
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Evaluation metric could not produce a score
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Anamnesis operations
pub type Result<T> = std::result::Result<T, AnamnesisError>;

/// Convert anyhow::Error to AnamnesisError
impl From<anyhow::Error> for AnamnesisError {
    fn from(err: anyhow::Error) -> Self {
        AnamnesisError::Other(err.to_string())
    }
}
