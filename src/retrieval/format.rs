//! Result formatting
//!
//! Renders a [`ResultSet`] as a single text block for prompt assembly.
//! Each populated category gets a header followed by one bullet line per
//! record; see [`ChunkRecord::render`](crate::types::ChunkRecord::render)
//! for the field-priority rule behind each line.

use crate::types::ResultSet;

/// Fixed sentinel emitted when no category holds any result, so downstream
/// prompt assembly never silently loses its context section.
pub const NO_INFORMATION_FOUND: &str = "No relevant information found.";

/// Render the result set as a prompt context block.
pub fn format_results(results: &ResultSet) -> String {
    if results.is_empty() {
        return NO_INFORMATION_FOUND.to_string();
    }

    let mut parts = Vec::new();
    for (category, items) in results.iter() {
        if items.is_empty() {
            continue;
        }
        parts.push(format!("\n--- {} ---", category));
        for entry in items {
            parts.push(format!("• {}", entry.record.render()));
        }
    }

    parts.join("\n")
}
