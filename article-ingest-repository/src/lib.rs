//! # Article Ingest Repository
//!
//! This crate provides the two sinks of the ingest pipeline: a relational
//! record store and a full-text document index. It includes definitions for
//! errors and interfaces, plus concrete implementations for PostgreSQL and
//! OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;
pub mod types;

pub use config::PostgresConfig;
pub use errors::{RecordStoreError, SearchIndexError};
pub use interfaces::{DocumentIndexProvider, RecordStore};
pub use opensearch::{IndexConfig, OpenSearchProvider};
pub use postgres::PostgresRecordStore;
pub use types::IndexOptions;
