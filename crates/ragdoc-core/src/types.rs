//! Core domain types for the ragdoc pipeline.

use serde::{Deserialize, Serialize};

/// Name of the full-text field records are stored under.
pub const TEXT_FIELD: &str = "text";

/// Name of the dense vector field records are stored under.
pub const EMBED_FIELD: &str = "embed";

/// Candidate pool size for the nearest-neighbor sub-query.
pub const KNN_NUM_CANDIDATES: usize = 10_000;

/// A sentence-aligned segment of a document.
///
/// `text` preserves the (whitespace-normalized) surface form of the covered
/// sentences; `lemma` is the order-preserving projection of its content
/// tokens with punctuation, brackets, digits, and stopwords removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    pub lemma: String,
}

/// A record as persisted in the storage backend.
///
/// The record id is not part of the body; it is passed alongside on upsert
/// and follows the `{doc_id}-{ordinal}` contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedRecord {
    pub name: String,
    pub text: String,
    pub lemma: String,
    pub embed: Vec<f32>,
}

/// A scored hit returned by the retriever. Request-scoped, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub text: String,
}

/// Lexical sub-query: match `query` against `field`, weighted by `boost`.
#[derive(Debug, Clone)]
pub struct LexicalClause {
    pub field: &'static str,
    pub query: String,
    pub boost: f32,
}

/// Vector sub-query: nearest-neighbor search over `field`.
#[derive(Debug, Clone)]
pub struct VectorClause {
    pub field: &'static str,
    pub vector: Vec<f32>,
    pub k: usize,
    pub num_candidates: usize,
    pub boost: f32,
}

/// A complete (non-streamed) generation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text.
    pub response: String,

    /// Tokens consumed by the prompt, when the gateway reports them.
    pub prompt_tokens: Option<u64>,

    /// Tokens produced in the response.
    pub response_tokens: Option<u64>,

    /// Wall-clock generation time in nanoseconds.
    pub duration_ns: Option<u64>,
}

/// An event on a streaming generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A partial output token, emitted as it arrives.
    Token(String),

    /// Terminal event carrying the token counts for the exchange.
    Done {
        prompt_tokens: Option<u64>,
        response_tokens: Option<u64>,
    },
}
