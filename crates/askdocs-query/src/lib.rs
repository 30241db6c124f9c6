//! askdocs-query - Retrieval and answer synthesis
//!
//! This crate composes the vector store, the embedding provider, and the
//! language model: embed the question, retrieve the top-k most similar
//! entries, render the prompt template, and stream the generated answer
//! alongside the ranked sources.
//!
//! # Example
//!
//! ```rust,ignore
//! use askdocs_query::QueryEngine;
//! use std::sync::Arc;
//!
//! let engine = QueryEngine::open(store, embedder, generator, "survival_docs", 3).await?;
//! let response = engine.query("How do I purify water?").await?;
//! ```

mod engine;

pub use engine::{QueryEngine, QueryResponse};

// Re-export for convenience
pub use askdocs_core::SourceNode;
