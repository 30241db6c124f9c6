//! askdocs-store - SQLite persistence layer
//!
//! This crate provides the persistent vector collection: (embedding, text,
//! metadata) entries keyed by collection name, with exact cosine-similarity
//! retrieval.

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

// Re-export schema for testing/migrations
pub use schema::{SCHEMA, SCHEMA_VERSION};
