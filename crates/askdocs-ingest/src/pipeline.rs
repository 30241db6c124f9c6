//! Ingestion pipeline: wipe the collection, embed, persist.

use std::sync::Arc;

use tracing::{debug, info};

use askdocs_core::{Document, Embedder, Entry, Result, VectorStore};

/// Full-rebuild ingestion over a named collection.
///
/// Every run destroys the existing collection and re-embeds the whole
/// document set; there is no incremental update and no rollback on partial
/// failure.
pub struct IngestPipeline<S, E> {
    store: Arc<S>,
    embedder: Arc<E>,
    collection: String,
}

impl<S, E> IngestPipeline<S, E>
where
    S: VectorStore,
    E: Embedder,
{
    /// Create a new ingestion pipeline.
    pub fn new(store: Arc<S>, embedder: Arc<E>, collection: &str) -> Self {
        Self {
            store,
            embedder,
            collection: collection.to_string(),
        }
    }

    /// Rebuild the collection from the given documents.
    ///
    /// Returns the number of persisted entries.
    pub async fn run(&self, documents: Vec<Document>) -> Result<usize> {
        info!(
            "Ingesting {} document(s) into collection '{}'",
            documents.len(),
            self.collection
        );

        self.store.reset_collection(&self.collection).await?;

        let total = documents.len();
        for (i, doc) in documents.into_iter().enumerate() {
            let name = doc.file_name().unwrap_or("<unnamed>").to_string();
            debug!("Embedding {}/{}: {}", i + 1, total, name);

            let embedding = self.embedder.embed(&doc.text).await?;
            let entry = Entry::from_document(doc, embedding, &self.collection);
            self.store.insert_entry(entry).await?;
        }

        let count = self.store.count_entries(&self.collection).await? as usize;
        info!("Ingestion complete: {} entries persisted", count);

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_core::FILE_NAME_KEY;
    use askdocs_ollama::MockEmbedder;
    use askdocs_store::SqliteStore;

    fn docs() -> Vec<Document> {
        vec![
            Document::new("fire.txt", "Rubbing sticks together generates heat via friction."),
            Document::new("water.txt", "Boil water for at least one minute before drinking."),
        ]
    }

    #[tokio::test]
    async fn test_one_entry_per_document() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let embedder = Arc::new(MockEmbedder::new());
        let pipeline = IngestPipeline::new(store.clone(), embedder, "survival_docs");

        let count = pipeline.run(docs()).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.count_entries("survival_docs").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_double_ingestion_is_idempotent() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let embedder = Arc::new(MockEmbedder::new());
        let pipeline = IngestPipeline::new(store.clone(), embedder.clone(), "survival_docs");

        pipeline.run(docs()).await.unwrap();
        let count = pipeline.run(docs()).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.count_entries("survival_docs").await.unwrap(), 2);

        // Content equivalent to a single run
        let query = embedder.embed("friction fire sticks").await.unwrap();
        let results = store
            .similarity_search("survival_docs", &query, 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file_name(), Some("fire.txt"));
    }

    #[tokio::test]
    async fn test_single_file_scenario() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let embedder = Arc::new(MockEmbedder::new());
        let pipeline = IngestPipeline::new(store.clone(), embedder, "survival_docs");

        let count = pipeline
            .run(vec![Document::new(
                "fire.txt",
                "Rubbing sticks together generates heat via friction.",
            )])
            .await
            .unwrap();

        assert_eq!(count, 1);

        let results = store
            .similarity_search("survival_docs", &[0.0; 64], 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].metadata.get(FILE_NAME_KEY).and_then(|v| v.as_str()),
            Some("fire.txt")
        );
    }
}
