//! ragdoc-segment - Sentence-aligned text segmentation
//!
//! This crate turns raw document text into retrieval-sized chunks. The text
//! is first annotated with token and sentence boundaries ([`analyze`]), then
//! grouped into word-budgeted windows that never cut a sentence in half
//! ([`chunk`]). Each chunk carries a filtered lemma projection used as the
//! lexical/embedding input downstream.
//!
//! # Example
//!
//! ```rust
//! use ragdoc_segment::{analyze, chunk};
//!
//! let doc = analyze("Cats sleep often. Dogs bark loudly.");
//! let chunks = chunk(&doc, 300);
//! assert_eq!(chunks.len(), 1);
//! ```

mod analyze;
mod chunk;

pub use analyze::{analyze, AnalyzedText, Token};
pub use chunk::chunk;

// Re-export the chunk type for convenience
pub use ragdoc_core::TextChunk;
