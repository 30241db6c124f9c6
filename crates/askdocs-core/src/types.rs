//! Core domain types for the ingestion and query pipelines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ulid::Ulid;

/// Metadata key carrying the originating file name.
pub const FILE_NAME_KEY: &str = "file_name";

/// A document loaded from the source directory.
///
/// Documents exist only for the duration of an ingestion run; what persists
/// is the derived [`Entry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (ULID).
    pub id: Ulid,

    /// Raw text body.
    pub text: String,

    /// User-visible metadata, at minimum the source file name.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Create a new document from a file's name and contents.
    pub fn new(file_name: &str, text: impl Into<String>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(
            FILE_NAME_KEY.to_string(),
            serde_json::Value::String(file_name.to_string()),
        );

        Self {
            id: Ulid::new(),
            text: text.into(),
            metadata,
        }
    }

    /// The originating file name, if recorded.
    pub fn file_name(&self) -> Option<&str> {
        self.metadata.get(FILE_NAME_KEY).and_then(|v| v.as_str())
    }
}

/// A persisted vector store entry: one whole-document embedding plus the
/// original text and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier within the collection (ULID).
    pub id: Ulid,

    /// Collection this entry belongs to.
    pub collection: String,

    /// Original document text.
    pub text: String,

    /// Embedding vector (fixed length per model).
    pub embedding: Vec<f32>,

    /// Metadata carried over from the source document.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Creation timestamp (Unix millis).
    pub created_at: u64,
}

impl Entry {
    /// Derive an entry from a document and its embedding.
    pub fn from_document(doc: Document, embedding: Vec<f32>, collection: &str) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        Self {
            id: doc.id,
            collection: collection.to_string(),
            text: doc.text,
            embedding,
            metadata: doc.metadata,
            created_at: now,
        }
    }
}

/// A retrieved source: a read-only projection of an [`Entry`] ranked by
/// similarity to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceNode {
    /// Entry identifier.
    pub id: Ulid,

    /// Cosine similarity to the query (higher is better).
    pub score: f32,

    /// Entry text.
    pub text: String,

    /// Entry metadata.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SourceNode {
    /// The originating file name, if recorded.
    pub fn file_name(&self) -> Option<&str> {
        self.metadata.get(FILE_NAME_KEY).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_records_file_name() {
        let doc = Document::new("fire.txt", "Rubbing sticks together generates heat.");
        assert_eq!(doc.file_name(), Some("fire.txt"));
    }

    #[test]
    fn test_entry_from_document_keeps_identity() {
        let doc = Document::new("water.txt", "Boil water for one minute to purify it.");
        let doc_id = doc.id;

        let entry = Entry::from_document(doc, vec![0.1, 0.2, 0.3], "survival_docs");
        assert_eq!(entry.id, doc_id);
        assert_eq!(entry.collection, "survival_docs");
        assert_eq!(entry.embedding.len(), 3);
        assert_eq!(
            entry.metadata.get(FILE_NAME_KEY).and_then(|v| v.as_str()),
            Some("water.txt")
        );
    }
}
