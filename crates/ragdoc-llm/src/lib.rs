//! ragdoc-llm - LLM gateway client
//!
//! HTTP client for an Ollama-compatible model server, covering the three
//! operations the pipeline needs: text embeddings, one-shot generation, and
//! streamed generation. A deterministic [`MockGateway`] is provided for
//! exercising the pipeline without a running model server.

mod mock;
mod ollama;

pub use mock::MockGateway;
pub use ollama::OllamaGateway;

// Re-export the gateway traits for convenience
pub use ragdoc_core::{EmbeddingGateway, GenerationGateway};
