//! Integration tests for the retrieval pipeline
//!
//! Exercises the full rewrite -> search -> merge -> expand path against
//! stub store and generator implementations:
//! - score ordering and dedup after merge
//! - global result cap truncation
//! - partial failure isolation across categories
//! - dangling connection tolerance
//! - the end-to-end chat scenario

use anamnesis_core::{
    Category, ChatSession, LlmQueryRewriter, RetrievalConfig, Retriever, RewriteFallback,
};
use std::sync::Arc;

mod common;
use common::{content_chunk, titled_chunk, StubGenerator, StubRewriter, StubStore};

fn config() -> RetrievalConfig {
    RetrievalConfig {
        follow_connections: false,
        ..RetrievalConfig::default()
    }
}

#[tokio::test]
async fn test_scores_non_increasing_within_category() {
    let store = StubStore::new()
        .with_result(Category::Event, titled_chunk("e1", "picnic", "in the park", 0.3))
        .with_result(Category::Event, titled_chunk("e2", "party", "at home", 0.9))
        .with_result(Category::Event, titled_chunk("e3", "walk", "by the canal", 0.6));
    let rewriter = StubRewriter::with_rewrites(vec![("events", Category::Event)]);
    let retriever = Retriever::new(Arc::new(store), Arc::new(rewriter), config());

    let output = retriever.retrieve("what happened?").await.unwrap();

    let items = output.results.get(Category::Event).unwrap();
    assert_eq!(items.len(), 3);
    for pair in items.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "scores must be non-increasing"
        );
    }
}

#[tokio::test]
async fn test_dedup_keeps_higher_score_across_rewrites() {
    // Two rewritten queries for the same category return the same record
    // with different scores; the merge must keep one entry at 0.9.
    let store = StubStore::new()
        .with_query_result(Category::Event, "gifts", titled_chunk("e1", "gift", "a bicycle", 0.4))
        .with_query_result(Category::Event, "presents", titled_chunk("e1", "gift", "a bicycle", 0.9));
    let rewriter = StubRewriter::with_rewrites(vec![
        ("gifts", Category::Event),
        ("presents", Category::Event),
    ]);
    let retriever = Retriever::new(Arc::new(store), Arc::new(rewriter), config());

    let output = retriever.retrieve("what gifts?").await.unwrap();

    let items = output.results.get(Category::Event).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].record.object_id, "e1");
    assert_eq!(items[0].score, 0.9);
}

#[tokio::test]
async fn test_truncation_to_total_cap() {
    let store = StubStore::new()
        .with_result(Category::Event, titled_chunk("e1", "a", "a", 0.9))
        .with_result(Category::Event, titled_chunk("e2", "b", "b", 0.2))
        .with_result(Category::Event, titled_chunk("e3", "c", "c", 0.8))
        .with_result(Category::Person, content_chunk("p1", "anne", 0.7))
        .with_result(Category::Person, content_chunk("p2", "margot", 0.1));
    let rewriter = StubRewriter::with_rewrites(vec![
        ("events", Category::Event),
        ("people", Category::Person),
    ]);
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(rewriter),
        RetrievalConfig {
            max_total_results: 3,
            ..config()
        },
    );

    let output = retriever.retrieve("everything").await.unwrap();

    assert_eq!(output.results.total_len(), 3);
    // The three highest scores survive; the two lowest are dropped
    assert!(output.results.contains(Category::Event, "e1"));
    assert!(output.results.contains(Category::Event, "e3"));
    assert!(output.results.contains(Category::Person, "p1"));
    assert!(!output.results.contains(Category::Event, "e2"));
    assert!(!output.results.contains(Category::Person, "p2"));
}

#[tokio::test]
async fn test_partial_failure_is_not_total_failure() {
    // One category's search raises, the other returns two results: the
    // result set holds exactly the successful category's two entries.
    let store = StubStore::new()
        .with_failure(Category::Event)
        .with_result(Category::Emotion, content_chunk("m1", "joy", 0.8))
        .with_result(Category::Emotion, content_chunk("m2", "worry", 0.5));
    let rewriter = StubRewriter::with_rewrites(vec![
        ("events", Category::Event),
        ("feelings", Category::Emotion),
    ]);
    let retriever = Retriever::new(Arc::new(store), Arc::new(rewriter), config());

    let output = retriever.retrieve("how did it feel?").await.unwrap();

    assert_eq!(output.results.total_len(), 2);
    assert_eq!(output.results.get(Category::Event).unwrap().len(), 0);
    assert_eq!(output.results.get(Category::Emotion).unwrap().len(), 2);
}

#[tokio::test]
async fn test_dangling_connections_are_skipped() {
    // The connection's target exists in no collection: expansion must not
    // crash and must add nothing.
    let store = StubStore::new()
        .with_result(Category::Event, titled_chunk("e1", "party", "birthday", 0.9))
        .with_connection("e1", "ghost", "mentions");
    let rewriter = StubRewriter::with_rewrites(vec![("events", Category::Event)]);
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(rewriter),
        RetrievalConfig {
            follow_connections: true,
            ..RetrievalConfig::default()
        },
    );

    let output = retriever.retrieve("the party").await.unwrap();

    assert_eq!(output.results.total_len(), 1);
    assert!(output.results.contains(Category::Event, "e1"));
}

#[tokio::test]
async fn test_connection_expansion_adds_discounted_record() {
    let target = titled_chunk("p1", "Kitty", "the imaginary friend", 0.0).record;
    let store = StubStore::new()
        .with_result(Category::Event, titled_chunk("e1", "party", "birthday", 0.8))
        .with_connection("e1", "p1", "involves")
        .with_record(Category::Person, target);
    let rewriter = StubRewriter::with_rewrites(vec![("events", Category::Event)]);
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(rewriter),
        RetrievalConfig {
            follow_connections: true,
            connection_discount: 0.5,
            ..RetrievalConfig::default()
        },
    );

    let output = retriever.retrieve("the party").await.unwrap();

    let people = output.results.get(Category::Person).unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].record.object_id, "p1");
    assert!((people[0].score - 0.4).abs() < 1e-6);
    // Direct results are untouched
    assert_eq!(output.results.get(Category::Event).unwrap().len(), 1);
}

#[tokio::test]
async fn test_expanded_record_never_outranks_direct_matches() {
    // A strong origin would produce a discounted score above the weakest
    // direct match; the synthetic score is clamped below it.
    let target = content_chunk("p2", "the neighbor", 0.0).record;
    let store = StubStore::new()
        .with_result(Category::Event, titled_chunk("e1", "party", "birthday", 1.0))
        .with_result(Category::Person, content_chunk("p1", "anne", 0.2))
        .with_connection("e1", "p2", "involves")
        .with_record(Category::Person, target);
    let rewriter = StubRewriter::with_rewrites(vec![
        ("events", Category::Event),
        ("people", Category::Person),
    ]);
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(rewriter),
        RetrievalConfig {
            follow_connections: true,
            connection_discount: 0.5,
            ..RetrievalConfig::default()
        },
    );

    let output = retriever.retrieve("the party").await.unwrap();

    let people = output.results.get(Category::Person).unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0].record.object_id, "p1");
    assert_eq!(people[1].record.object_id, "p2");
    assert!(people[1].score <= 0.2);
}

#[tokio::test]
async fn test_rewrite_fallback_uses_original_query() {
    let store = StubStore::new()
        .with_result(Category::Person, content_chunk("p1", "anne", 0.7));
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(StubRewriter::failing()),
        RetrievalConfig {
            rewrite_fallback: RewriteFallback::OriginalAsDefault,
            default_category: Category::Person,
            ..config()
        },
    );

    let output = retriever.retrieve("who is anne?").await.unwrap();

    assert_eq!(output.queries_used.len(), 1);
    assert_eq!(output.queries_used[0].text, "who is anne?");
    assert_eq!(output.queries_used[0].category, Category::Person);
    assert_eq!(output.results.total_len(), 1);
}

#[tokio::test]
async fn test_rewrite_abort_policy_propagates() {
    let retriever = Retriever::new(
        Arc::new(StubStore::new()),
        Arc::new(StubRewriter::failing()),
        RetrievalConfig {
            rewrite_fallback: RewriteFallback::Abort,
            ..config()
        },
    );

    assert!(retriever.retrieve("anything").await.is_err());
}

#[tokio::test]
async fn test_end_to_end_birthday_scenario() {
    // The rewriter's model proposes one Event query; the store returns one
    // Event chunk; the formatted context reaches the answer generator.
    let rewrite_model = Arc::new(StubGenerator::fixed(
        "REWRITE: Event, gifts received for the birthday",
    ));
    let store = StubStore::new().with_result(
        Category::Event,
        titled_chunk("e1", "Birthday gift", "received a bicycle", 0.95),
    );
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(LlmQueryRewriter::new(rewrite_model, 5)),
        config(),
    );

    let output = retriever
        .retrieve("What gifts did Anne receive for her birthday?")
        .await
        .unwrap();

    assert!(output
        .queries_used
        .iter()
        .any(|q| q.category == Category::Event));
    let context = anamnesis_core::format_results(&output.results);
    assert!(context.contains("Birthday gift: received a bicycle"));

    // Re-run through the chat session with an echoing answer generator
    let store = StubStore::new().with_result(
        Category::Event,
        titled_chunk("e1", "Birthday gift", "received a bicycle", 0.95),
    );
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(StubRewriter::with_rewrites(vec![(
            "gifts received",
            Category::Event,
        )])),
        config(),
    );
    let session = ChatSession::new(retriever, Arc::new(StubGenerator::echo_len()));

    let answer = session
        .chat("What gifts did Anne receive for her birthday?")
        .await
        .unwrap();
    assert!(!answer.is_empty());
}

#[tokio::test]
async fn test_generation_failure_becomes_inline_error() {
    let store = StubStore::new().with_result(
        Category::Event,
        titled_chunk("e1", "Birthday gift", "received a bicycle", 0.95),
    );
    let retriever = Retriever::new(
        Arc::new(store),
        Arc::new(StubRewriter::with_rewrites(vec![("gifts", Category::Event)])),
        config(),
    );
    let session = ChatSession::new(retriever, Arc::new(StubGenerator::failing()));

    let answer = session.chat("What gifts?").await.unwrap();
    assert!(answer.starts_with("Error generating response:"));
}

#[tokio::test]
async fn test_empty_store_formats_to_sentinel() {
    let retriever = Retriever::new(
        Arc::new(StubStore::new()),
        Arc::new(StubRewriter::with_rewrites(vec![("gifts", Category::Event)])),
        config(),
    );

    let output = retriever.retrieve("anything at all").await.unwrap();
    assert_eq!(
        anamnesis_core::format_results(&output.results),
        anamnesis_core::NO_INFORMATION_FOUND
    );
}
