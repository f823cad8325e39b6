//! Relevance metrics
//!
//! The scoring seam the harness depends on. Implementations must expose
//! scores through [`RelevanceMetric::score`] alone; when that fails, the
//! harness records zero for the metric rather than guessing at the result
//! shape.

use crate::error::{AnamnesisError, Result};
use crate::services::TextGenerator;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// One evaluated query with its retrieved context texts.
#[derive(Debug, Clone)]
pub struct EvalSample {
    pub query: String,
    pub retrieved_contexts: Vec<String>,
}

/// A named relevance metric over an evaluation dataset.
#[async_trait]
pub trait RelevanceMetric: Send + Sync {
    fn name(&self) -> &str;

    /// Score the dataset in [0.0, 1.0]. Errors when no score can be
    /// produced at all; partial per-sample trouble is the implementation's
    /// to absorb.
    async fn score(&self, samples: &[EvalSample]) -> Result<f64>;
}

/// LLM-judged context relevance.
///
/// Asks the judge to rate each sample's contexts against its query on a
/// 0-10 scale and averages the normalized ratings. Samples whose judgment
/// cannot be parsed are skipped; a dataset where nothing could be judged
/// is an error, which the harness records as zero.
pub struct LlmContextRelevance {
    generator: Arc<dyn TextGenerator>,
}

impl LlmContextRelevance {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn prompt(sample: &EvalSample) -> String {
        format!(
            r#"You are judging a retrieval system. Rate how relevant the retrieved passages are to the question, from 0 (unrelated) to 10 (directly answers it).

Question: {}

Retrieved passages:
{}

Format your response EXACTLY as:
SCORE: <number>
"#,
            sample.query,
            sample
                .retrieved_contexts
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

/// Parse a `SCORE: <n>` line into a clamped 0-10 rating.
fn parse_score(response: &str) -> Option<f64> {
    response
        .lines()
        .find_map(|line| line.trim().strip_prefix("SCORE:"))
        .and_then(|rest| rest.trim().parse::<f64>().ok())
        .map(|score| score.clamp(0.0, 10.0))
}

#[async_trait]
impl RelevanceMetric for LlmContextRelevance {
    fn name(&self) -> &str {
        "context_relevance"
    }

    async fn score(&self, samples: &[EvalSample]) -> Result<f64> {
        let mut ratings = Vec::with_capacity(samples.len());

        for sample in samples {
            match self.generator.generate(&Self::prompt(sample)).await {
                Ok(response) => match parse_score(&response) {
                    Some(rating) => ratings.push(rating / 10.0),
                    None => {
                        warn!("Unparseable judge response for '{}'", sample.query);
                    }
                },
                Err(e) => {
                    warn!("Judge call failed for '{}': {}", sample.query, e);
                }
            }
        }

        if ratings.is_empty() {
            return Err(AnamnesisError::Evaluation(
                "no sample could be judged".to_string(),
            ));
        }

        debug!("Judged {}/{} samples", ratings.len(), samples.len());
        Ok(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}
