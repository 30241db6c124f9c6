//! askdocs-core - Core types and traits for the askdocs pipelines
//!
//! This crate provides the foundational types, traits, configuration, and
//! error handling shared by the ingestion and query pipelines.

pub mod config;
pub mod error;
pub mod prompt;
pub mod traits;
pub mod types;

pub use config::AskdocsConfig;
pub use error::{AskdocsError, Result};
pub use prompt::{PromptTemplate, DEFAULT_QA_TEMPLATE};
pub use traits::*;
pub use types::*;
