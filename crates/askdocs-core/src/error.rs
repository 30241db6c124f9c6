//! Error types for the askdocs pipelines.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AskdocsError.
pub type Result<T> = std::result::Result<T, AskdocsError>;

/// Errors that can occur in the ingestion and query pipelines.
#[derive(Error, Debug)]
pub enum AskdocsError {
    /// Source directory does not exist.
    #[error("Source directory not found: {path:?}. Create it and add your documents.")]
    SourceDirMissing { path: PathBuf },

    /// Source directory contains no readable documents.
    #[error("No readable documents in {path:?}. Add some text files and re-run ingestion.")]
    SourceDirEmpty { path: PathBuf },

    /// Persistent store has not been created yet.
    #[error("Vector store not found at {path:?}. Run `askdocs ingest` first.")]
    StoreMissing { path: PathBuf },

    /// Collection not found in the persistent store.
    #[error("Collection not found: {name}. Run `askdocs ingest` first.")]
    CollectionNotFound { name: String },

    /// Prompt template is missing a required slot.
    #[error("Invalid prompt template: missing {slot} slot")]
    InvalidTemplate { slot: &'static str },

    /// Database error.
    #[error("Database error: {message}")]
    Database { message: String },

    /// Embedding model error.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Language model generation error.
    #[error("Generation error: {message}")]
    Generation { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AskdocsError {
    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
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
        let err = AskdocsError::CollectionNotFound {
            name: "survival_docs".to_string(),
        };
        assert!(err.to_string().contains("survival_docs"));
    }

    #[test]
    fn test_store_missing_names_path() {
        let err = AskdocsError::StoreMissing {
            path: PathBuf::from("./askdocs.db"),
        };
        assert!(err.to_string().contains("askdocs.db"));
        assert!(err.to_string().contains("ingest"));
    }
}
