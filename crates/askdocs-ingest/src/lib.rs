//! askdocs-ingest - Document loading and ingestion
//!
//! This crate reads a source directory into documents and rebuilds the
//! persistent vector collection from them (full wipe, one entry per file).

mod loader;
mod pipeline;

pub use loader::load_documents;
pub use pipeline::IngestPipeline;
