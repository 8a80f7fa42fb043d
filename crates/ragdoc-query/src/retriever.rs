//! Hybrid retriever.

use std::sync::Arc;

use tracing::{debug, info};

use ragdoc_core::{
    EmbeddingGateway, LexicalClause, RagdocError, Result, SearchBackend, SearchConfig, SearchHit,
    VectorClause, EMBED_FIELD, KNN_NUM_CANDIDATES, TEXT_FIELD,
};

/// Executes combined lexical+vector queries and filters the results.
pub struct Retriever<B, G> {
    backend: Arc<B>,
    gateway: Arc<G>,
    config: SearchConfig,
}

impl<B, G> Retriever<B, G>
where
    B: SearchBackend,
    G: EmbeddingGateway,
{
    /// Create a retriever over injected service handles.
    pub fn new(backend: Arc<B>, gateway: Arc<G>, config: SearchConfig) -> Self {
        Self {
            backend,
            gateway,
            config,
        }
    }

    /// Search for the chunks most relevant to `query`.
    ///
    /// Embeds the query once, submits one combined query (the backend fuses
    /// the sub-query scores), and keeps only hits scoring strictly above the
    /// configured threshold, preserving the backend's descending order. An
    /// empty result after filtering is a valid outcome, not an error.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        if query.is_empty() {
            return Err(RagdocError::invalid_argument("query must not be empty"));
        }

        let vector = self.gateway.embed(query).await?;

        let lexical = LexicalClause {
            field: TEXT_FIELD,
            query: query.to_string(),
            boost: self.config.lexical_boost,
        };

        let knn = VectorClause {
            field: EMBED_FIELD,
            vector,
            k: self.config.size * 2,
            num_candidates: KNN_NUM_CANDIDATES,
            boost: self.config.vector_boost,
        };

        let hits = self.backend.query(&lexical, &knn, self.config.size).await?;
        debug!(candidates = hits.len(), "backend returned hits");

        let threshold = self.config.score_threshold;
        let hits: Vec<SearchHit> = hits.into_iter().filter(|h| h.score > threshold).collect();

        info!(hits = hits.len(), threshold, "search complete");

        Ok(hits)
    }
}
