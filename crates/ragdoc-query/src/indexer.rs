//! Document indexer.

use std::sync::Arc;

use tracing::{debug, info};

use ragdoc_core::{
    EmbeddingGateway, IndexedRecord, RagdocError, Result, SearchBackend, TextChunk,
};

/// Persists segmented chunks as searchable records.
pub struct Indexer<B, G> {
    backend: Arc<B>,
    gateway: Arc<G>,
}

impl<B, G> Indexer<B, G>
where
    B: SearchBackend,
    G: EmbeddingGateway,
{
    /// Create an indexer over injected service handles.
    pub fn new(backend: Arc<B>, gateway: Arc<G>) -> Self {
        Self { backend, gateway }
    }

    /// Ensure the backing collection exists.
    ///
    /// An already-existing collection is a success; any other
    /// collection-creation failure propagates.
    pub async fn init(&self) -> Result<()> {
        match self.backend.create_collection().await {
            Ok(()) => Ok(()),
            Err(RagdocError::CollectionExists { name }) => {
                debug!(collection = %name, "collection already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Index `chunks` under `doc_id`, in order.
    ///
    /// Record ids follow the `{doc_id}-{ordinal}` contract, so re-indexing
    /// the same document overwrites the same records. Strictly sequential
    /// and fail-fast: the first per-chunk failure halts the remaining work
    /// with the cause attached; records already written stay persisted.
    ///
    /// An empty `chunks` slice is a no-op; an empty `doc_id` is an error.
    pub async fn index(&self, chunks: &[TextChunk], doc_id: &str) -> Result<()> {
        if doc_id.is_empty() {
            return Err(RagdocError::invalid_argument("doc_id must not be empty"));
        }

        if chunks.is_empty() {
            return Ok(());
        }

        for (i, chunk) in chunks.iter().enumerate() {
            let id = format!("{}-{}", doc_id, i);

            let embed = self
                .gateway
                .embed(&chunk.lemma)
                .await
                .map_err(|e| RagdocError::indexing_failed(id.as_str(), e))?;

            let record = IndexedRecord {
                name: id.clone(),
                text: chunk.text.clone(),
                lemma: chunk.lemma.clone(),
                embed,
            };

            self.backend
                .upsert(&id, &record)
                .await
                .map_err(|e| RagdocError::indexing_failed(id.as_str(), e))?;

            info!(id = %id, "indexed record");
        }

        Ok(())
    }
}
