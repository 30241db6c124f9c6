//! Configuration for the ingestion and query pipelines.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Explicit configuration object, passed into each pipeline constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskdocsConfig {
    /// Language model name (Ollama tag).
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Embedding model name (Ollama tag).
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Base URL of the Ollama runtime.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Path to the persistent vector store file.
    #[serde(default = "default_persist_path")]
    pub persist_path: PathBuf,

    /// Directory holding the raw source documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Named collection shared by ingestion and query.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Similarity fan-out for retrieval.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Model request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AskdocsConfig {
    fn default() -> Self {
        Self {
            llm_model: default_llm_model(),
            embedding_model: default_embedding_model(),
            ollama_url: default_ollama_url(),
            persist_path: default_persist_path(),
            data_dir: default_data_dir(),
            collection: default_collection(),
            top_k: default_top_k(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Default value functions

fn default_llm_model() -> String {
    "qwen3:8b-q4_K_M".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text:137m-v1.5-fp16".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_persist_path() -> PathBuf {
    PathBuf::from("./askdocs.db")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./survival_docs")
}

fn default_collection() -> String {
    "survival_docs".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl AskdocsConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::AskdocsError::config(format!("Failed to parse config: {}", e))
        })?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> crate::error::Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("askdocs").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("askdocs.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        // Return defaults
        Ok(Self::default())
    }

    /// Model request timeout as a duration.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
