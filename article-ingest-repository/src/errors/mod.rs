//! Error types for the article ingest repository.
//!
//! One error type per sink: `SearchIndexError` for the document index and
//! `RecordStoreError` for the relational store.

mod record_store_error;
mod search_index_error;

pub use record_store_error::RecordStoreError;
pub use search_index_error::SearchIndexError;
