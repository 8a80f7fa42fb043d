//! Error types for the ragdoc pipeline.

use thiserror::Error;

/// Result type alias using RagdocError.
pub type Result<T> = std::result::Result<T, RagdocError>;

/// Errors that can occur in the ragdoc pipeline.
#[derive(Error, Debug)]
pub enum RagdocError {
    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Collection already exists. Swallowed by `Indexer::init`.
    #[error("Collection already exists: {name}")]
    CollectionExists { name: String },

    /// Collection creation failed for any other reason.
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// Embedding/generation gateway transport or protocol failure.
    #[error("Gateway unavailable: {message}")]
    GatewayUnavailable { message: String },

    /// First per-record failure during indexing; remaining work was halted.
    #[error("Indexing failed at record {id}")]
    IndexingFailed {
        id: String,
        #[source]
        source: Box<RagdocError>,
    },

    /// Storage backend rejected a record write.
    #[error("Backend write failed: {message}")]
    BackendWriteFailed { message: String },

    /// Storage backend query failure during search.
    #[error("Backend query failed: {message}")]
    BackendQueryFailed { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RagdocError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::GatewayUnavailable {
            message: message.into(),
        }
    }

    /// Wrap the underlying cause of an indexing failure.
    pub fn indexing_failed(id: impl Into<String>, source: RagdocError) -> Self {
        Self::IndexingFailed {
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Create a backend write error.
    pub fn backend_write(message: impl Into<String>) -> Self {
        Self::BackendWriteFailed {
            message: message.into(),
        }
    }

    /// Create a backend query error.
    pub fn backend_query(message: impl Into<String>) -> Self {
        Self::BackendQueryFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagdocError::invalid_argument("doc_id must not be empty");
        assert!(err.to_string().contains("doc_id"));
    }

    #[test]
    fn test_indexing_failed_keeps_cause() {
        let cause = RagdocError::gateway("connection refused");
        let err = RagdocError::indexing_failed("a.txt-3", cause);
        assert!(err.to_string().contains("a.txt-3"));

        let source = std::error::Error::source(&err).expect("cause attached");
        assert!(source.to_string().contains("connection refused"));
    }
}
