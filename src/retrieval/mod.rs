//! Retrieval pipeline for categorized diary chunks
//!
//! One `retrieve` call flows through four stages:
//! 1. **Rewrite**: the user query fans out into category-targeted queries
//!    ([`rewrite`]).
//! 2. **Search & merge**: one similarity search per rewritten query, merged
//!    per category with dedup and a global result cap ([`retriever`]).
//! 3. **Connection expansion**: optional one-hop walk along stored edges,
//!    tolerant of dangling targets ([`connections`]).
//! 4. **Formatting**: the result set rendered as a prompt context block
//!    ([`format`]).

pub mod connections;
pub mod format;
pub mod retriever;
pub mod rewrite;

pub use connections::{ConnectionResolver, ExpansionStats};
pub use format::{format_results, NO_INFORMATION_FOUND};
pub use retriever::Retriever;
pub use rewrite::{LlmQueryRewriter, PassthroughRewriter, QueryRewritePolicy};
