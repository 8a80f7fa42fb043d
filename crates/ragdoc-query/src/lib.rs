//! ragdoc-query - Document indexing and hybrid retrieval
//!
//! The two pipeline stages over the storage backend and embedding gateway
//! seams:
//!
//! - [`Indexer`]: persists segmented chunks as searchable records, one
//!   embedding call and one upsert per chunk, fail-fast.
//! - [`Retriever`]: embeds a query once, submits one combined
//!   lexical+vector query, and post-filters the scored hits.
//!
//! Both hold `Arc` handles to services constructed once at startup.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragdoc_query::{Indexer, Retriever};
//!
//! let indexer = Indexer::new(backend.clone(), gateway.clone());
//! indexer.init().await?;
//! indexer.index(&chunks, "a.txt").await?;
//!
//! let retriever = Retriever::new(backend, gateway, config.search);
//! let hits = retriever.search("cat sleep").await?;
//! ```

mod indexer;
mod retriever;

pub use indexer::Indexer;
pub use retriever::Retriever;

// Re-export for convenience
pub use ragdoc_core::{SearchHit, TextChunk};
