//! Deterministic in-process gateway double.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::stream;
use futures_util::StreamExt;

use ragdoc_core::{
    EmbeddingGateway, EventStream, Generation, GenerationGateway, RagdocError, Result,
    StreamEvent,
};

/// In-process gateway double with deterministic embeddings.
///
/// Embeddings are bag-of-words vectors (each whitespace token bumps one
/// hash-selected component), L2-normalized, so texts sharing terms have a
/// high cosine similarity. Call counters allow asserting that an operation
/// never reached the gateway.
pub struct MockGateway {
    dimension: usize,
    fail_embeddings: bool,
    embed_calls: AtomicUsize,
    generate_calls: AtomicUsize,
}

impl MockGateway {
    /// Create a mock gateway with a small default dimensionality.
    pub fn new() -> Self {
        Self::with_dimension(32)
    }

    /// Create a mock gateway producing vectors of `dimension` components.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            fail_embeddings: false,
            embed_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
        }
    }

    /// Make every embedding call fail as if the gateway were unreachable.
    pub fn failing() -> Self {
        Self {
            fail_embeddings: true,
            ..Self::new()
        }
    }

    /// Number of embedding calls received.
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Number of generation calls received.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    fn bag_of_words(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.dimension;
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        embedding
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingGateway for MockGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(RagdocError::invalid_argument("text must not be empty"));
        }

        self.embed_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_embeddings {
            return Err(RagdocError::gateway("mock gateway offline"));
        }

        Ok(self.bag_of_words(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl GenerationGateway for MockGateway {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        if prompt.is_empty() {
            return Err(RagdocError::invalid_argument("prompt must not be empty"));
        }

        self.generate_calls.fetch_add(1, Ordering::SeqCst);

        Ok(Generation {
            response: "mock response".to_string(),
            prompt_tokens: Some(prompt.split_whitespace().count() as u64),
            response_tokens: Some(2),
            duration_ns: Some(1),
        })
    }

    async fn stream(&self, prompt: &str) -> Result<EventStream<'static>> {
        let generation = self.generate(prompt).await?;

        let mut events: Vec<Result<StreamEvent>> = generation
            .response
            .split_inclusive(' ')
            .map(|t| Ok(StreamEvent::Token(t.to_string())))
            .collect();
        events.push(Ok(StreamEvent::Done {
            prompt_tokens: generation.prompt_tokens,
            response_tokens: generation.response_tokens,
        }));

        Ok(stream::iter(events).boxed())
    }
}
