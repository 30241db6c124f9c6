//! SQLite-based vector store implementation.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info};
use ulid::Ulid;

use askdocs_core::{AskdocsError, Entry, Result, SourceNode, VectorStore};

use crate::schema::SCHEMA;

/// SQLite-backed vector store.
///
/// Embeddings are stored as little-endian f32 blobs. Retrieval is an exact
/// cosine-similarity scan over the named collection, which is more than
/// adequate at document-per-entry collection sizes.
#[derive(Debug)]
pub struct SqliteStore {
    /// Connection wrapped in a blocking Mutex.
    conn: Arc<Mutex<Connection>>,
}

// Connection access is serialized through the Mutex.
unsafe impl Send for SqliteStore {}
unsafe impl Sync for SqliteStore {}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AskdocsError::database(format!("Failed to open database: {}", e)))?;

        Self::init(conn, path)
    }

    /// Open an existing database, failing if it has not been created yet.
    ///
    /// The query pipeline uses this so a missing store is diagnosed before
    /// any model call is attempted.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AskdocsError::StoreMissing {
                path: path.to_path_buf(),
            });
        }

        Self::open(path)
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AskdocsError::database(format!("Failed to open in-memory database: {}", e))
        })?;

        Self::init(conn, Path::new(":memory:"))
    }

    /// Initialize the store with a connection.
    fn init(conn: Connection, path: &Path) -> Result<Self> {
        Self::configure_connection(&conn)?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| AskdocsError::database(format!("Failed to initialize schema: {}", e)))?;

        info!("Vector store opened at {:?}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Configure SQLite connection for optimal performance.
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 30000;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            "#,
        )
        .map_err(|e| AskdocsError::database(format!("Failed to configure connection: {}", e)))?;

        Ok(())
    }

    /// Execute a blocking operation on the connection.
    fn with_conn<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AskdocsError::database(e.to_string()))?;
        f(&conn)
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.with_conn(|conn| {
            let count: u64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM collections WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .map_err(|e| AskdocsError::database(e.to_string()))?;

            Ok(count > 0)
        })
    }

    async fn reset_collection(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        self.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| AskdocsError::database(e.to_string()))?;

            // Entries are removed by CASCADE
            tx.execute("DELETE FROM collections WHERE name = ?1", params![name])
                .map_err(|e| AskdocsError::database(e.to_string()))?;

            tx.execute(
                "INSERT INTO collections (name, created_at) VALUES (?1, ?2)",
                params![name, now as i64],
            )
            .map_err(|e| AskdocsError::database(format!("Failed to create collection: {}", e)))?;

            tx.commit()
                .map_err(|e| AskdocsError::database(e.to_string()))?;

            info!("Reset collection: {}", name);
            Ok(())
        })
    }

    async fn insert_entry(&self, entry: Entry) -> Result<()> {
        let metadata = serde_json::to_string(&entry.metadata)?;
        let embedding_bytes = vec_to_bytes(&entry.embedding);

        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO entries (id, collection, text, embedding, dimensions, metadata, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    entry.id.to_string(),
                    entry.collection,
                    entry.text,
                    embedding_bytes,
                    entry.embedding.len() as i64,
                    metadata,
                    entry.created_at as i64,
                ],
            )
            .map_err(|e| AskdocsError::database(format!("Failed to insert entry: {}", e)))?;

            debug!("Inserted entry: {}", entry.id);
            Ok(())
        })
    }

    async fn count_entries(&self, collection: &str) -> Result<u64> {
        let collection = collection.to_string();
        self.with_conn(|conn| {
            let count: u64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM entries WHERE collection = ?1",
                    params![collection],
                    |row| row.get(0),
                )
                .map_err(|e| AskdocsError::database(e.to_string()))?;

            Ok(count)
        })
    }

    async fn similarity_search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<SourceNode>> {
        let collection = collection.to_string();
        let query = embedding.to_vec();

        self.with_conn(move |conn| {
            // rowid order gives stable insertion-order tie-breaking
            let mut stmt = conn
                .prepare(
                    r#"
                    SELECT id, text, embedding, metadata
                    FROM entries
                    WHERE collection = ?1
                    ORDER BY rowid
                    "#,
                )
                .map_err(|e| AskdocsError::database(e.to_string()))?;

            let rows = stmt
                .query_map(params![collection], |row| {
                    let id_str: String = row.get(0)?;
                    let text: String = row.get(1)?;
                    let embedding_bytes: Vec<u8> = row.get(2)?;
                    let metadata_str: String = row.get(3)?;
                    Ok((id_str, text, embedding_bytes, metadata_str))
                })
                .map_err(|e| AskdocsError::database(e.to_string()))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| AskdocsError::database(e.to_string()))?;

            let mut scored = Vec::with_capacity(rows.len());
            for (id_str, text, embedding_bytes, metadata_str) in rows {
                let entry_embedding = bytes_to_vec(&embedding_bytes);
                let score = cosine_similarity(&query, &entry_embedding);

                scored.push(SourceNode {
                    id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::nil()),
                    score,
                    text,
                    metadata: serde_json::from_str(&metadata_str).unwrap_or_default(),
                });
            }

            // Stable sort keeps insertion order among equal scores
            scored.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            scored.truncate(k);

            debug!(
                "Similarity search over '{}' returned {} results",
                collection,
                scored.len()
            );

            Ok(scored)
        })
    }
}

/// Convert f32 vector to bytes (little-endian).
fn vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes (little-endian) back to an f32 vector.
fn bytes_to_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    dot / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_core::Document;

    fn entry(collection: &str, file_name: &str, text: &str, embedding: Vec<f32>) -> Entry {
        Entry::from_document(Document::new(file_name, text), embedding, collection)
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_embedding_roundtrip() {
        let values = vec![1.0f32, -2.5, 3.25];
        assert_eq!(bytes_to_vec(&vec_to_bytes(&values)), values);
    }

    #[tokio::test]
    async fn test_reset_creates_empty_collection() {
        let store = SqliteStore::open_memory().unwrap();

        assert!(!store.collection_exists("docs").await.unwrap());
        store.reset_collection("docs").await.unwrap();
        assert!(store.collection_exists("docs").await.unwrap());
        assert_eq!(store.count_entries("docs").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let store = SqliteStore::open_memory().unwrap();
        store.reset_collection("docs").await.unwrap();

        store
            .insert_entry(entry("docs", "a.txt", "alpha", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .insert_entry(entry("docs", "b.txt", "beta", vec![0.0, 1.0]))
            .await
            .unwrap();

        assert_eq!(store.count_entries("docs").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reset_wipes_previous_entries() {
        let store = SqliteStore::open_memory().unwrap();

        store.reset_collection("docs").await.unwrap();
        store
            .insert_entry(entry("docs", "a.txt", "alpha", vec![1.0, 0.0]))
            .await
            .unwrap();
        assert_eq!(store.count_entries("docs").await.unwrap(), 1);

        // Second run rebuilds from scratch
        store.reset_collection("docs").await.unwrap();
        assert_eq!(store.count_entries("docs").await.unwrap(), 0);

        store
            .insert_entry(entry("docs", "a.txt", "alpha", vec![1.0, 0.0]))
            .await
            .unwrap();
        assert_eq!(store.count_entries("docs").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_ranks_by_descending_similarity() {
        let store = SqliteStore::open_memory().unwrap();
        store.reset_collection("docs").await.unwrap();

        store
            .insert_entry(entry("docs", "far.txt", "far", vec![0.0, 1.0]))
            .await
            .unwrap();
        store
            .insert_entry(entry("docs", "near.txt", "near", vec![1.0, 0.05]))
            .await
            .unwrap();
        store
            .insert_entry(entry("docs", "mid.txt", "mid", vec![0.7, 0.7]))
            .await
            .unwrap();

        let results = store
            .similarity_search("docs", &[1.0, 0.0], 3)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].file_name(), Some("near.txt"));
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn test_search_returns_min_of_k_and_total() {
        let store = SqliteStore::open_memory().unwrap();
        store.reset_collection("docs").await.unwrap();

        store
            .insert_entry(entry("docs", "only.txt", "only", vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = store
            .similarity_search("docs", &[1.0, 0.0], 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_ties_keep_insertion_order() {
        let store = SqliteStore::open_memory().unwrap();
        store.reset_collection("docs").await.unwrap();

        // Identical embeddings, identical scores
        store
            .insert_entry(entry("docs", "first.txt", "first", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .insert_entry(entry("docs", "second.txt", "second", vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = store
            .similarity_search("docs", &[1.0, 0.0], 2)
            .await
            .unwrap();
        assert_eq!(results[0].file_name(), Some("first.txt"));
        assert_eq!(results[1].file_name(), Some("second.txt"));
    }

    #[tokio::test]
    async fn test_open_existing_requires_prior_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("askdocs.db");

        let err = SqliteStore::open_existing(&path).unwrap_err();
        assert!(matches!(err, AskdocsError::StoreMissing { .. }));

        // Create it, then open_existing succeeds
        drop(SqliteStore::open(&path).unwrap());
        assert!(SqliteStore::open_existing(&path).is_ok());
    }

    #[tokio::test]
    async fn test_entries_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("askdocs.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.reset_collection("docs").await.unwrap();
            store
                .insert_entry(entry("docs", "a.txt", "alpha", vec![1.0, 0.0]))
                .await
                .unwrap();
        }

        let store = SqliteStore::open_existing(&path).unwrap();
        assert!(store.collection_exists("docs").await.unwrap());
        assert_eq!(store.count_entries("docs").await.unwrap(), 1);

        let results = store
            .similarity_search("docs", &[1.0, 0.0], 3)
            .await
            .unwrap();
        assert_eq!(results[0].text, "alpha");
    }
}
