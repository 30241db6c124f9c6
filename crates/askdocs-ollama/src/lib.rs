//! askdocs-ollama - Ollama model clients
//!
//! This crate provides the embedding and generation providers backed by a
//! locally hosted Ollama runtime, plus deterministic mocks for tests.
//!
//! # Features
//!
//! - Embeddings via `POST /api/embeddings`
//! - Streaming generation via `POST /api/generate` (NDJSON)
//! - Configurable request timeout

mod client;
mod mock;

pub use client::{OllamaEmbedder, OllamaGenerator};
pub use mock::{FailingGenerator, MockEmbedder, MockGenerator};

// Re-export the provider traits for convenience
pub use askdocs_core::{Embedder, Generator};
