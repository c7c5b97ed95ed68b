//! Document index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use article_ingest_shared::ArticleDocument;

use crate::errors::SearchIndexError;
use crate::types::IndexOptions;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into the dual writer to enable dependency injection and
/// easy testing with mock implementations.
///
/// # Index Initialization
///
/// Implementations should call `ensure_index_exists` during application startup to ensure
/// the search index and any aliases are properly configured before indexing documents.
#[async_trait]
pub trait DocumentIndexProvider: Send + Sync {
    /// Ensure the search index and any required aliases exist, creating them if necessary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If initialization fails
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Index a new document.
    ///
    /// Each call creates a new document with a backend-generated identifier; documents
    /// are never updated or deleted by the pipeline.
    ///
    /// # Arguments
    ///
    /// * `document` - The article document to index
    /// * `options` - Per-request options; `synchronous_refresh` makes the document
    ///   searchable before the call returns
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the backend acknowledged the document
    /// * `Err(SearchIndexError)` - If the request failed or was rejected
    async fn index_document(
        &self,
        document: &ArticleDocument,
        options: IndexOptions,
    ) -> Result<(), SearchIndexError>;
}
