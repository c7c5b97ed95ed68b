//! Loader module for the article ingest pipeline.
//!
//! Writes each mapped article to the record store and then to the document
//! index. The two writes are independent: a failure in one never prevents the
//! other, and nothing is retried or rolled back.

use std::sync::Arc;
use tracing::{error, info, instrument};

use article_ingest_repository::{
    DocumentIndexProvider, IndexOptions, RecordStore, RecordStoreError, SearchIndexError,
};
use article_ingest_shared::{ArticleDocument, ArticleRecord};

use crate::errors::IngestError;

/// Result of writing one article to both sinks.
#[derive(Debug)]
pub struct WriteOutcome {
    /// Store-assigned record id, or the record store failure.
    pub record: Result<i64, RecordStoreError>,
    /// Document index result.
    pub index: Result<(), SearchIndexError>,
}

impl WriteOutcome {
    /// Whether both writes succeeded.
    pub fn is_success(&self) -> bool {
        self.record.is_ok() && self.index.is_ok()
    }

    /// Collapse into a single result, reporting the record failure first.
    pub fn into_result(self) -> Result<i64, IngestError> {
        let id = self.record?;
        self.index?;
        Ok(id)
    }
}

/// Writes articles to the record store and the document index.
pub struct DualWriter {
    store: Arc<dyn RecordStore>,
    index: Arc<dyn DocumentIndexProvider>,
    index_options: IndexOptions,
}

impl DualWriter {
    /// Create a writer that refreshes the index synchronously on every write.
    pub fn new(store: Arc<dyn RecordStore>, index: Arc<dyn DocumentIndexProvider>) -> Self {
        Self::with_options(store, index, IndexOptions::synchronous())
    }

    /// Create a writer with custom index request options.
    pub fn with_options(
        store: Arc<dyn RecordStore>,
        index: Arc<dyn DocumentIndexProvider>,
        index_options: IndexOptions,
    ) -> Self {
        Self {
            store,
            index,
            index_options,
        }
    }

    /// Write the record, then the document.
    ///
    /// Both writes are always attempted. On record success the assigned id is
    /// stored in `record.id`.
    #[instrument(skip_all, fields(title = %record.title, article_id = %document.article_id))]
    pub async fn write(
        &self,
        record: &mut ArticleRecord,
        document: &ArticleDocument,
    ) -> WriteOutcome {
        let record_result = self.store.create(record).await;
        match &record_result {
            Ok(id) => {
                record.id = Some(*id);
                info!(id = *id, title = %record.title, "Inserted article into record store");
            }
            Err(e) => {
                error!(title = %record.title, error = %e, "Failed to insert article into record store");
            }
        }

        let index_result = self.index.index_document(document, self.index_options).await;
        match &index_result {
            Ok(()) => {
                info!(article_id = %document.article_id, "Indexed article document");
            }
            Err(e) => {
                error!(
                    article_id = %document.article_id,
                    error = %e,
                    "Failed to index article document"
                );
            }
        }

        WriteOutcome {
            record: record_result,
            index: index_result,
        }
    }
}
