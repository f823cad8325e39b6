//! Core data types for the Anamnesis retrieval system
//!
//! This module defines the fundamental data structures used throughout
//! anamnesis: diary chunk records, their categories, connections between
//! chunks, rewritten queries, and the per-category result set produced by
//! one retrieval call.

use serde::{Deserialize, Serialize};

/// Entity categories that diary chunks are classified into.
///
/// Each category maps to one named collection in the vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Event,
    Person,
    Emotion,
    Thought,
    Problem,
    Achievement,
    FutureIntention,
}

impl Category {
    /// All categories, in canonical order. This order is used when probing
    /// collections for a connection target.
    pub const ALL: [Category; 7] = [
        Category::Event,
        Category::Person,
        Category::Emotion,
        Category::Thought,
        Category::Problem,
        Category::Achievement,
        Category::FutureIntention,
    ];

    /// Name of the vector store collection holding this category's chunks.
    pub fn collection_name(&self) -> &'static str {
        match self {
            Category::Event => "ChunkEvent",
            Category::Person => "ChunkPerson",
            Category::Emotion => "ChunkEmotion",
            Category::Thought => "ChunkThought",
            Category::Problem => "ChunkProblem",
            Category::Achievement => "ChunkAchievement",
            Category::FutureIntention => "ChunkFutureIntention",
        }
    }

    /// Parse a category from its display name.
    ///
    /// Matching is case-insensitive and tolerates separators, so rewriter
    /// output like `future_intention` or `Future Intention` resolves too.
    pub fn from_name(s: &str) -> Option<Category> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "event" => Some(Category::Event),
            "person" => Some(Category::Person),
            "emotion" => Some(Category::Emotion),
            "thought" => Some(Category::Thought),
            "problem" => Some(Category::Problem),
            "achievement" => Some(Category::Achievement),
            "futureintention" => Some(Category::FutureIntention),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Event => "Event",
            Category::Person => "Person",
            Category::Emotion => "Emotion",
            Category::Thought => "Thought",
            Category::Problem => "Problem",
            Category::Achievement => "Achievement",
            Category::FutureIntention => "FutureIntention",
        };
        write!(f, "{}", name)
    }
}

/// Which field a labeled chunk's short label came from.
///
/// Retained so the rendering priority (title before name) stays observable
/// after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Title,
    Name,
}

/// Descriptive body of a chunk, chosen at decode time.
///
/// The variant selection order is load-bearing for output readability and
/// must not change: title+description, then name+description, then a bare
/// content field, then the raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape")]
pub enum ChunkBody {
    Labeled {
        kind: LabelKind,
        label: String,
        description: String,
    },
    Content {
        content: String,
    },
    Opaque {
        raw: serde_json::Value,
    },
}

/// A stored unit of categorized diary text.
///
/// Read-only from the retriever's point of view; `metadata` carries any
/// additional payload fields the core does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub object_id: String,
    pub body: ChunkBody,
    pub metadata: serde_json::Value,
}

impl ChunkRecord {
    /// Decode a chunk from a store payload.
    ///
    /// Returns `None` when the payload carries no usable `object_id`;
    /// such records cannot be deduplicated or linked and are skipped.
    pub fn from_json(payload: serde_json::Value) -> Option<ChunkRecord> {
        let object_id = payload.get("object_id")?.as_str()?.to_string();

        let field = |name: &str| -> Option<String> {
            payload
                .get(name)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        let body = if let (Some(label), Some(description)) = (field("title"), field("description"))
        {
            ChunkBody::Labeled {
                kind: LabelKind::Title,
                label,
                description,
            }
        } else if let (Some(label), Some(description)) = (field("name"), field("description")) {
            ChunkBody::Labeled {
                kind: LabelKind::Name,
                label,
                description,
            }
        } else if let Some(content) = field("content") {
            ChunkBody::Content { content }
        } else {
            ChunkBody::Opaque {
                raw: payload.clone(),
            }
        };

        Some(ChunkRecord {
            object_id,
            body,
            metadata: payload,
        })
    }

    /// Render the chunk as a single context line.
    pub fn render(&self) -> String {
        match &self.body {
            ChunkBody::Labeled {
                label, description, ..
            } => format!("{}: {}", label, description),
            ChunkBody::Content { content } => content.clone(),
            ChunkBody::Opaque { raw } => raw.to_string(),
        }
    }
}

/// A directed edge between two chunk identifiers.
///
/// The store does not guarantee referential integrity: `target_id` may not
/// exist in any collection, and consumers must treat that as routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub relation: String,
}

/// A (query text, target category) pair produced by query rewriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewrittenQuery {
    pub text: String,
    pub category: Category,
}

/// A chunk paired with its relevance score; higher is more relevant.
/// No fixed score range is guaranteed across categories.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub record: ChunkRecord,
    pub score: f32,
}

/// Per-category mapping of scored results for one retrieval call.
///
/// Category order is the order categories were first populated; entries
/// within a category are kept descending by score after the merge step.
/// Not cached or persisted across calls.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: Vec<(Category, Vec<ScoredChunk>)>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a category slot exists, preserving first-population order.
    /// A failed search still claims its slot, with zero results.
    pub fn ensure_category(&mut self, category: Category) {
        if !self.entries.iter().any(|(c, _)| *c == category) {
            self.entries.push((category, Vec::new()));
        }
    }

    /// Merge one scored chunk into a category, deduplicating by `object_id`.
    /// When the same record arrives twice the higher score wins.
    pub fn merge(&mut self, category: Category, chunk: ScoredChunk) {
        self.ensure_category(category);
        if let Some((_, items)) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            if let Some(existing) = items
                .iter_mut()
                .find(|e| e.record.object_id == chunk.record.object_id)
            {
                if chunk.score > existing.score {
                    *existing = chunk;
                }
            } else {
                items.push(chunk);
            }
        }
    }

    /// Whether a category already holds the given object id.
    pub fn contains(&self, category: Category, object_id: &str) -> bool {
        self.get(category)
            .map(|items| items.iter().any(|e| e.record.object_id == object_id))
            .unwrap_or(false)
    }

    pub fn get(&self, category: Category) -> Option<&[ScoredChunk]> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, items)| items.as_slice())
    }

    /// Lowest score currently held by a category, if it has any entries.
    pub fn min_score(&self, category: Category) -> Option<f32> {
        self.get(category)?
            .iter()
            .map(|e| e.score)
            .fold(None, |acc, s| match acc {
                Some(m) if m <= s => Some(m),
                _ => Some(s),
            })
    }

    /// Iterate categories and their results in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[ScoredChunk])> {
        self.entries.iter().map(|(c, items)| (*c, items.as_slice()))
    }

    /// Total number of entries across all categories.
    pub fn total_len(&self) -> usize {
        self.entries.iter().map(|(_, items)| items.len()).sum()
    }

    /// True when no category holds any result.
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Sort every category's entries descending by score (stable, so equal
    /// scores keep their merge order).
    pub fn sort_descending(&mut self) {
        for (_, items) in &mut self.entries {
            items.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    /// Reduce the set to at most `cap` total entries, dropping the lowest
    /// scores first. When two categories tie for the lowest entry, the
    /// earlier-inserted category gives up its entry first.
    ///
    /// Requires entries sorted descending (see [`ResultSet::sort_descending`]).
    pub fn truncate_total(&mut self, cap: usize) {
        while self.total_len() > cap {
            let mut victim: Option<(usize, f32)> = None;
            for (idx, (_, items)) in self.entries.iter().enumerate() {
                if let Some(last) = items.last() {
                    match victim {
                        Some((_, score)) if last.score >= score => {}
                        _ => victim = Some((idx, last.score)),
                    }
                }
            }
            match victim {
                Some((idx, _)) => {
                    self.entries[idx].1.pop();
                }
                None => break,
            }
        }
    }
}

/// Output of one retrieval call: the result set plus the rewritten queries
/// that produced it (consumed by diagnostics).
#[derive(Debug, Clone)]
pub struct RetrievalOutput {
    pub results: ResultSet,
    pub queries_used: Vec<RewrittenQuery>,
}
