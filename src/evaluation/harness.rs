//! Evaluation harness
//!
//! Drives every registered adapter over the query set, builds a dataset of
//! (query, retrieved contexts) samples per adapter, scores it with each
//! metric, and produces one report per retriever. Query files may be a
//! bare JSON array or `{"queries": [...]}`; a missing file falls back to
//! built-in sample queries so the harness stays runnable on a fresh
//! checkout.

use crate::error::Result;
use crate::evaluation::adapters::RetrieverAdapter;
use crate::evaluation::metrics::{EvalSample, RelevanceMetric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Fallback queries used when no query file is present.
const SAMPLE_QUERIES: [&str; 3] = [
    "What activities did the author do with friends?",
    "What challenges did the author face?",
    "What emotions did the author express about family?",
];

/// Summary of one retriever's evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub retriever: String,
    /// Queries that produced a valid dataset entry
    pub num_queries: usize,
    /// Metric name -> score; 0.0 records a metric that failed to score
    pub metrics: BTreeMap<String, f64>,
    pub generated_at: DateTime<Utc>,
}

/// Runs adapters over queries and scores the resulting datasets.
pub struct RetrievalEvaluator {
    metrics: Vec<Box<dyn RelevanceMetric>>,
    top_k: usize,
}

impl RetrievalEvaluator {
    pub fn new(metrics: Vec<Box<dyn RelevanceMetric>>, top_k: usize) -> Self {
        Self { metrics, top_k }
    }

    /// Load evaluation queries from a JSON file.
    ///
    /// Accepts a bare array of strings or an object with a `queries`
    /// field. A missing or malformed file degrades to the built-in
    /// samples with a warning, never an error.
    pub fn load_queries(path: &Path) -> Vec<String> {
        let fallback = || SAMPLE_QUERIES.iter().map(|q| q.to_string()).collect();

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Queries file {} not readable ({}); using sample queries",
                    path.display(),
                    e
                );
                return fallback();
            }
        };

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum QueryFile {
            Bare(Vec<String>),
            Wrapped { queries: Vec<String> },
        }

        match serde_json::from_str::<QueryFile>(&raw) {
            Ok(QueryFile::Bare(queries)) | Ok(QueryFile::Wrapped { queries }) => queries,
            Err(e) => {
                warn!(
                    "Queries file {} has unexpected shape ({}); using sample queries",
                    path.display(),
                    e
                );
                fallback()
            }
        }
    }

    /// Evaluate one adapter over the query set.
    ///
    /// Never fails: a query that errors or returns nothing is skipped, and
    /// a metric that cannot score records 0.0.
    pub async fn evaluate_adapter(
        &self,
        adapter: &dyn RetrieverAdapter,
        queries: &[String],
    ) -> EvaluationReport {
        info!("Evaluating {}...", adapter.name());

        let mut samples = Vec::new();
        for query in queries {
            match adapter.retrieve(query, self.top_k).await {
                Ok(contexts) if !contexts.is_empty() => {
                    samples.push(EvalSample {
                        query: query.clone(),
                        retrieved_contexts: contexts,
                    });
                }
                Ok(_) => {
                    debug!("{}: no results for '{}', skipping", adapter.name(), query);
                }
                Err(e) => {
                    warn!(
                        "{}: retrieval failed for '{}' ({}), skipping",
                        adapter.name(),
                        query,
                        e
                    );
                }
            }
        }

        let mut metric_scores = BTreeMap::new();
        if samples.is_empty() {
            warn!("{}: no valid queries, recording zero metrics", adapter.name());
            for metric in &self.metrics {
                metric_scores.insert(metric.name().to_string(), 0.0);
            }
        } else {
            debug!("{}: dataset of {} samples", adapter.name(), samples.len());
            for metric in &self.metrics {
                let score = match metric.score(&samples).await {
                    Ok(score) => score,
                    Err(e) => {
                        warn!(
                            "{}: metric {} failed ({}), recording zero",
                            adapter.name(),
                            metric.name(),
                            e
                        );
                        0.0
                    }
                };
                metric_scores.insert(metric.name().to_string(), score);
            }
        }

        EvaluationReport {
            retriever: adapter.name().to_string(),
            num_queries: samples.len(),
            metrics: metric_scores,
            generated_at: Utc::now(),
        }
    }

    /// Evaluate every adapter in registry order.
    pub async fn run(
        &self,
        adapters: &[Box<dyn RetrieverAdapter>],
        queries: &[String],
    ) -> Vec<EvaluationReport> {
        info!(
            "Starting evaluation: {} retrievers, {} queries",
            adapters.len(),
            queries.len()
        );

        let mut reports = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            reports.push(self.evaluate_adapter(adapter.as_ref(), queries).await);
        }
        reports
    }
}

/// Write one pretty-printed JSON file per report, overwriting prior runs.
pub fn save_reports(reports: &[EvaluationReport], output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    for report in reports {
        let path = output_dir.join(format!("results_{}.json", report.retriever));
        fs::write(&path, serde_json::to_string_pretty(report)?)?;
        info!("Saved {} results to {}", report.retriever, path.display());
    }
    Ok(())
}

/// Print the fixed-width summary table.
pub fn print_summary(reports: &[EvaluationReport]) {
    println!();
    println!("{}", "=".repeat(60));
    println!("RETRIEVAL EVALUATION SUMMARY");
    println!("{}", "=".repeat(60));
    println!("{:<16} {:<8} {}", "Retriever", "Queries", "Scores");
    println!("{}", "-".repeat(60));

    for report in reports {
        let scores = report
            .metrics
            .iter()
            .map(|(name, score)| format!("{}={:.3}", name, score))
            .collect::<Vec<_>>()
            .join("  ");
        println!(
            "{:<16} {:<8} {}",
            report.retriever, report.num_queries, scores
        );
    }
    println!();
}
