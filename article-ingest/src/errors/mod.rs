//! Error types for the article ingest pipeline.

use thiserror::Error;

use article_ingest_repository::{RecordStoreError, SearchIndexError};

/// Reasons a decoded payload cannot be mapped into an article.
///
/// All variants are per-message: the message is skipped and nothing is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The root is not an object holding an object under `novel`.
    #[error("payload has no `novel` object")]
    MissingContainer,

    /// The `novel` object has no entries.
    #[error("`novel` object is empty")]
    EmptyContainer,

    /// The `novel` object has more than one entry.
    #[error("`novel` object has {0} entries, expected exactly one")]
    MultipleEntries(usize),

    /// The single `novel` entry is not an object.
    #[error("`novel` entry {0:?} is not an object")]
    EntryNotObject(String),
}

/// Errors that can occur while handling a single queue message.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Payload bytes are not valid JSON.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Decoded payload has an unexpected shape.
    #[error("Extraction error: {0}")]
    ExtractionError(#[from] ExtractionError),

    /// Record store write failed.
    #[error("Record store error: {0}")]
    RecordStoreError(#[from] RecordStoreError),

    /// Document index write failed.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchIndexError),

    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),
}

impl IngestError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}
