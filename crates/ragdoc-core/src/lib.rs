//! ragdoc-core - Core types and traits for the ragdoc pipeline
//!
//! This crate provides the foundational types, traits, configuration, and
//! error handling used throughout the ragdoc workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{RagdocError, Result};
pub use traits::*;
pub use types::*;
