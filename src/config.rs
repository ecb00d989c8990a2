//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Embedding backend selection
    #[serde(default)]
    pub backend: EmbeddingBackend,
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Data paths
    #[serde(default)]
    pub paths: PathsConfig,
    /// Vector collection name
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
}

fn default_collection_name() -> String {
    "arxiv_papers".to_string()
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            server: ServerConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            paths: PathsConfig::default(),
            collection_name: default_collection_name(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing sections
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load `openrag.toml` from the working directory if present,
    /// otherwise use defaults
    pub fn load_or_default() -> Self {
        let path = Path::new("openrag.toml");
        if path.exists() {
            match Self::load(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load openrag.toml, using defaults: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Read the OpenAI API key from the environment
    ///
    /// The key is never stored in the config file. Returns `None` when the
    /// variable is unset or empty; generation is disabled in that case while
    /// retrieval keeps working.
    pub fn openai_api_key() -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local embedding server (Ollama-compatible API, no credential needed)
    #[default]
    Local,
    /// OpenAI embeddings API (requires OPENAI_API_KEY)
    Openai,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the local embedding server
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Embedding dimensions (opaque to this system, used for sanity checks)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            batch_size: 32,
            timeout_secs: 60,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (smaller trailing chunks are still kept,
    /// but whitespace-only fragments are dropped)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 1,
        }
    }
}

/// LLM (OpenAI API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL (OpenAI-compatible)
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.1,
            max_tokens: 1024,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of results per query
    pub top_k: usize,
    /// Minimum similarity for a hit to be returned (0.0-1.0)
    pub similarity_threshold: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.7,
        }
    }
}

/// Data path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root data directory
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl PathsConfig {
    /// Directory holding raw corpus documents
    pub fn corpus_dir(&self) -> PathBuf {
        self.data_dir.join("corpus")
    }

    /// Directory holding the persisted vector index
    pub fn vector_db_dir(&self) -> PathBuf {
        self.data_dir.join("vector_db")
    }
}
