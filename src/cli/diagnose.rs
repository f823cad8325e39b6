//! Store and pipeline diagnostics
//!
//! Probes the live system the way an operator would: shows how queries are
//! rewritten, how results distribute across categories, and how many
//! stored connections point at chunks that no longer exist.

use crate::config::AnamnesisConfig;
use crate::error::Result;
use crate::types::{Category, RetrievalOutput};
use std::sync::Arc;

/// Built-in probe queries used when none is given.
const PROBE_QUERIES: [&str; 3] = [
    "What gifts did the author receive for her birthday?",
    "Tell me about the author's relationship with her mother",
    "What emotions did the author express about school?",
];

/// Connections sampled for the integrity check.
const CONNECTION_SAMPLE: usize = 50;

/// Handle the diagnose command.
pub async fn handle(config: AnamnesisConfig, query: Option<String>) -> Result<()> {
    let (store, generator) = super::build_components(&config).await?;
    let retriever = super::build_retriever(Arc::clone(&store), generator, &config);

    let probes: Vec<String> = match query {
        Some(q) => vec![q],
        None => PROBE_QUERIES.iter().map(|q| q.to_string()).collect(),
    };

    println!("=== QUERY REWRITING AND DISTRIBUTION ===");
    println!();
    for probe in &probes {
        println!("Original: '{}'", probe);
        match retriever.retrieve(probe).await {
            Ok(output) => {
                println!("Rewritten queries:");
                for rewritten in &output.queries_used {
                    println!("  -> '{}' ({})", rewritten.text, rewritten.category);
                }
                print_distribution(&output, config.retrieval.max_total_results);
            }
            Err(e) => println!("  retrieval failed: {}", e),
        }
        println!();
    }

    println!("=== CONNECTION INTEGRITY ===");
    println!();
    match store.list_connections(CONNECTION_SAMPLE).await {
        Ok(connections) => {
            let total = connections.len();
            let mut broken = 0;

            for connection in &connections {
                let mut found = false;
                for category in Category::ALL {
                    if let Ok(Some(_)) = store
                        .fetch_by_object_id(category, &connection.target_id)
                        .await
                    {
                        found = true;
                        break;
                    }
                }
                if !found {
                    println!(
                        "  broken: {} -> {} ({})",
                        connection.source_id, connection.target_id, connection.relation
                    );
                    broken += 1;
                }
            }

            println!("Total connections sampled: {}", total);
            println!("Broken connections: {}", broken);
            if total > 0 {
                println!(
                    "Link success rate: {:.1}%",
                    (total - broken) as f64 / total as f64 * 100.0
                );
            }
        }
        Err(e) => println!("Could not inspect connections: {}", e),
    }

    Ok(())
}

fn print_distribution(output: &RetrievalOutput, dilution_threshold: usize) {
    println!("Result distribution:");

    let mut total = 0;
    for (category, items) in output.results.iter() {
        total += items.len();
        if items.is_empty() {
            println!("  {}: 0 items", category);
            continue;
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f32;
        for entry in items {
            min = min.min(entry.score);
            max = max.max(entry.score);
            sum += entry.score;
        }
        println!(
            "  {}: {} items (scores {:.3} - {:.3}, avg {:.3})",
            category,
            items.len(),
            min,
            max,
            sum / items.len() as f32
        );
    }

    println!("Total results: {}", total);
    if total >= dilution_threshold {
        println!("Warning: result count at the configured cap; raw matches were likely diluted across categories");
    }
}
