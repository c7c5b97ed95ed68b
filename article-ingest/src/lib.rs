//! # Article Ingest
//!
//! Consumes crawled Pixiv novels from Kafka, stores a relational record of each
//! in PostgreSQL and indexes a search document for it in OpenSearch.
//!
//! ## Architecture
//!
//! The pipeline follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Receives messages from Kafka
//! 2. **Processor**: Decodes payloads and maps them into articles
//! 3. **Loader**: Writes each article to the record store and the document index
//! 4. **Orchestrator**: Runs the sequential consume loop and commits offsets
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`consumer`]: Kafka consumer for novel messages
//! - [`processor`]: Payload decoding and article mapping
//! - [`loader`]: Dual write to PostgreSQL and OpenSearch
//! - [`orchestrator`]: The consume loop
//! - [`health`]: HTTP liveness endpoint
//! - [`errors`]: Error types for the pipeline

pub mod config;
pub mod consumer;
pub mod errors;
pub mod health;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use config::{Dependencies, Settings};
pub use errors::{ExtractionError, IngestError};

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
