//! Evaluation command
//!
//! Runs the registered retriever variants over the evaluation query set,
//! writes one JSON report per retriever, and prints the summary table.

use crate::config::AnamnesisConfig;
use crate::error::Result;
use crate::evaluation::{
    harness::{print_summary, save_reports},
    LlmContextRelevance, PipelineAdapter, RelevanceMetric, RetrievalEvaluator, RetrieverAdapter,
};
use crate::retrieval::{PassthroughRewriter, Retriever};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Handle the evaluate command.
pub async fn handle(
    config: AnamnesisConfig,
    queries_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    top_k: Option<usize>,
) -> Result<()> {
    let (store, generator) = super::build_components(&config).await?;

    let queries_file =
        queries_file.unwrap_or_else(|| PathBuf::from(&config.evaluation.queries_file));
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.evaluation.output_dir));
    let top_k = top_k.unwrap_or(config.evaluation.top_k);

    let queries = RetrievalEvaluator::load_queries(&queries_file);
    info!("Loaded {} evaluation queries", queries.len());

    // Registry: the full semantic pipeline, and an all-category passthrough
    // baseline that skips query rewriting.
    let semantic = super::build_retriever(store.clone(), generator.clone(), &config);
    let passthrough = Retriever::new(
        store.clone(),
        Arc::new(PassthroughRewriter::all_categories()),
        config.retrieval.clone(),
    );
    let adapters: Vec<Box<dyn RetrieverAdapter>> = vec![
        Box::new(PipelineAdapter::new("semantic", semantic)),
        Box::new(PipelineAdapter::new("passthrough", passthrough)),
    ];

    let metrics: Vec<Box<dyn RelevanceMetric>> =
        vec![Box::new(LlmContextRelevance::new(generator.clone()))];

    let evaluator = RetrievalEvaluator::new(metrics, top_k);
    let reports = evaluator.run(&adapters, &queries).await;

    save_reports(&reports, &output_dir)?;
    print_summary(&reports);

    Ok(())
}
