//! Chat session: retrieval-grounded question answering
//!
//! Owns the retriever and generator for the duration of a session; both
//! release their connections when the session drops, on every exit path.

use crate::error::Result;
use crate::retrieval::{format_results, Retriever};
use crate::services::TextGenerator;
use crate::types::RetrievalOutput;
use std::sync::Arc;
use tracing::debug;

/// Instruction template prepended to every answer prompt.
const DIARY_ASSISTANT_PROMPT: &str = "\
You are a careful assistant answering questions about the author's personal diary. \
Ground every statement in the retrieved information below; if it does not contain \
the answer, say so plainly instead of guessing. Keep answers concise and warm.";

/// One chat session over the diary.
pub struct ChatSession {
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
}

impl ChatSession {
    pub fn new(retriever: Retriever, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer one question grounded in retrieved diary context.
    ///
    /// Retrieval failures propagate (subject to the configured rewrite
    /// fallback); generation failures do not: they are folded into the
    /// returned answer text so the session survives them.
    pub async fn chat(&self, user_query: &str) -> Result<String> {
        let output = self.retriever.retrieve(user_query).await?;
        let context = format_results(&output.results);
        debug!(
            "Answering with {} retrieved entries",
            output.results.total_len()
        );

        let prompt = format!(
            "{}\n\nUser Question: {}\n\nRetrieved Information:\n{}\n\nAnswer:",
            DIARY_ASSISTANT_PROMPT, user_query, context
        );

        match self.generator.generate(&prompt).await {
            Ok(answer) => Ok(answer),
            Err(e) => Ok(format!("Error generating response: {}", e)),
        }
    }

    /// Run retrieval only, exposing the rewritten queries and raw results.
    /// Used by diagnostics and the evaluation adapter.
    pub async fn retrieve(&self, user_query: &str) -> Result<RetrievalOutput> {
        self.retriever.retrieve(user_query).await
    }
}
