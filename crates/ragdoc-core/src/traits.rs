//! Core traits defining the seams between components.
//!
//! The storage backend and the LLM gateway are externally shared services.
//! Concrete handles are constructed once at startup and injected into the
//! indexer and retriever.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::types::{Generation, IndexedRecord, LexicalClause, SearchHit, StreamEvent, VectorClause};

/// Storage backend seam.
///
/// The backend owns the ranking math: `query` submits both sub-queries in one
/// request and returns hits already fused and sorted by descending score.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Create the backing collection with the fixed record schema.
    ///
    /// Returns [`RagdocError::CollectionExists`](crate::RagdocError::CollectionExists)
    /// if the collection is already present.
    async fn create_collection(&self) -> Result<()>;

    /// Insert or overwrite the record stored under `id`.
    async fn upsert(&self, id: &str, record: &IndexedRecord) -> Result<()>;

    /// Execute a combined lexical+vector query, returning at most `size` hits.
    async fn query(
        &self,
        lexical: &LexicalClause,
        vector: &VectorClause,
        size: usize,
    ) -> Result<Vec<SearchHit>>;
}

/// Embedding gateway seam.
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// Embed a text string into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Configured embedding dimensionality.
    fn dimension(&self) -> usize;
}

/// Stream of partial generation events, terminated by a done event.
pub type EventStream<'a> = BoxStream<'a, Result<StreamEvent>>;

/// Generation gateway seam.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Generate a complete response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<Generation>;

    /// Stream partial output tokens for `prompt` as they arrive.
    async fn stream(&self, prompt: &str) -> Result<EventStream<'static>>;
}
