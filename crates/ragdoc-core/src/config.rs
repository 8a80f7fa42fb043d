//! Configuration for the ragdoc pipeline.
//!
//! The configuration is resolved once per invocation: defaults, overlaid by a
//! TOML file, overlaid by caller overrides. The resolved value is immutable
//! and passed by reference into each component at construction time.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{RagdocError, Result};

/// Main configuration for the ragdoc pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagdocConfig {
    /// Chunking configuration.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// LLM gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Search configuration.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target words per chunk. Chunks may run longer to finish a sentence.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

/// LLM gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Gateway port.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Model used for both embeddings and generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding vector dimensionality. Must match the collection schema.
    #[serde(default = "default_embed_dims")]
    pub embed_dims: usize,

    /// Generation options sent with every generate/stream request.
    #[serde(default)]
    pub options: GenerationOptions,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_gateway_port(),
            model: default_model(),
            embed_dims: default_embed_dims(),
            options: GenerationOptions::default(),
        }
    }
}

impl GatewayConfig {
    /// Base URL of the gateway.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Generation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Context window in tokens.
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,

    /// Output cap in tokens.
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            num_ctx: default_num_ctx(),
            num_predict: default_num_predict(),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Backend port.
    #[serde(default = "default_storage_port")]
    pub port: u16,

    /// Collection (index) name.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_storage_port(),
            collection: default_collection(),
        }
    }
}

impl StorageConfig {
    /// Base URL of the backend.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum hits requested from the backend.
    #[serde(default = "default_search_size")]
    pub size: usize,

    /// Minimum exclusive score for a hit to be kept.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Weight of the lexical sub-query.
    #[serde(default = "default_lexical_boost")]
    pub lexical_boost: f32,

    /// Weight of the vector sub-query.
    #[serde(default = "default_vector_boost")]
    pub vector_boost: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            size: default_search_size(),
            score_threshold: default_score_threshold(),
            lexical_boost: default_lexical_boost(),
            vector_boost: default_vector_boost(),
        }
    }
}

/// Per-invocation overrides resolved on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replace the collection name.
    pub collection: Option<String>,

    /// Replace the maximum number of hits.
    pub search_size: Option<usize>,

    /// Replace the score threshold.
    pub score_threshold: Option<f32>,
}

// Default value functions

fn default_chunk_size() -> usize {
    300
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_gateway_port() -> u16 {
    11434
}

fn default_model() -> String {
    "mistral:instruct".to_string()
}

fn default_embed_dims() -> usize {
    4096
}

fn default_temperature() -> f32 {
    0.8
}

fn default_num_ctx() -> u32 {
    4096
}

fn default_num_predict() -> u32 {
    512
}

fn default_storage_port() -> u16 {
    9200
}

fn default_collection() -> String {
    "ragdoc".to_string()
}

fn default_search_size() -> usize {
    5
}

fn default_score_threshold() -> f32 {
    3.0
}

fn default_lexical_boost() -> f32 {
    1.0
}

fn default_vector_boost() -> f32 {
    1.2
}

impl RagdocConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RagdocError::config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("ragdoc").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("ragdoc.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        // Return defaults
        Ok(Self::default())
    }

    /// Resolve a new configuration with the given overrides applied.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(collection) = overrides.collection {
            self.storage.collection = collection;
        }
        if let Some(size) = overrides.search_size {
            self.search.size = size;
        }
        if let Some(threshold) = overrides.score_threshold {
            self.search.score_threshold = threshold;
        }
        self
    }
}
