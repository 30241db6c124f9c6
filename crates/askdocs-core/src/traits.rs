//! Core traits defining the interfaces between components.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::Result;
use crate::types::{Entry, SourceNode};

/// Persistent vector store keyed by collection name.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check whether a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Delete any existing collection of this name and recreate it empty.
    ///
    /// Ingestion calls this once per run; there is no incremental update.
    async fn reset_collection(&self, name: &str) -> Result<()>;

    /// Persist one entry into its collection.
    async fn insert_entry(&self, entry: Entry) -> Result<()>;

    /// Number of entries in a collection.
    async fn count_entries(&self, collection: &str) -> Result<u64>;

    /// Return the top-k entries by cosine similarity to the query embedding,
    /// ranked by descending score. Ties keep insertion order.
    async fn similarity_search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SourceNode>>;
}

/// Embedding model interface.
///
/// The same method is used for documents and queries so both land in a
/// comparable vector space.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// An ordered, finite stream of generated answer tokens.
///
/// The stream ends when the model signals completion; the consumer pulls
/// tokens one at a time and may drop the stream to abandon generation.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Language model interface.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Submit a rendered prompt and stream back the answer incrementally.
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream>;
}
