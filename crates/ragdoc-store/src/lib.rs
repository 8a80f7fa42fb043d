//! ragdoc-store - Storage backend clients
//!
//! This crate talks to the search engine that persists indexed records and
//! executes combined lexical+vector queries. The engine owns the ranking
//! math; the client submits one hybrid query and deserializes the scored
//! hits it returns.
//!
//! [`ElasticBackend`] is the HTTP client for an Elasticsearch-compatible
//! engine. [`MemoryBackend`] is an in-process double with naive score fusion
//! for exercising the pipeline in tests.

mod elastic;
mod memory;
mod schema;

pub use elastic::ElasticBackend;
pub use memory::MemoryBackend;

// Re-export the backend trait for convenience
pub use ragdoc_core::SearchBackend;
