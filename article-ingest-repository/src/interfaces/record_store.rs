//! This module defines the `RecordStore` trait, the interface to the relational
//! store that keeps one row per ingested article.
use article_ingest_shared::ArticleRecord;

use crate::errors::RecordStoreError;

/// A trait that defines the interface for persisting article records.
///
/// Every call inserts a new row; there is no deduplication key, so creating the
/// same record twice yields two rows with distinct identifiers.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts an `ArticleRecord` and returns the identifier assigned by the store.
    ///
    /// The record's own `id` field is ignored.
    ///
    /// # Arguments
    ///
    /// * `record` - The record to insert.
    ///
    /// # Returns
    ///
    /// The store-assigned identifier, or a `RecordStoreError` if the insert fails.
    async fn create(&self, record: &ArticleRecord) -> Result<i64, RecordStoreError>;
}
