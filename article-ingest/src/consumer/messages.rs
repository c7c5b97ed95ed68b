//! Message types for the consumer.
//!
//! Defines the owned message that flows from the queue into the pipeline.

use std::borrow::Cow;

/// A message read from the queue, detached from the client's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Topic the message was read from.
    pub topic: String,
    /// Partition within the topic.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
    /// Optional message key.
    pub key: Option<Vec<u8>>,
    /// Payload bytes; empty when the message carried none.
    pub payload: Vec<u8>,
}

impl QueueMessage {
    /// Create a keyless message.
    pub fn new(
        topic: impl Into<String>,
        partition: i32,
        offset: i64,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload: payload.into(),
        }
    }

    /// Attach a key.
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The key as text for logging, `""` when absent.
    pub fn key_str(&self) -> Cow<'_, str> {
        match &self.key {
            Some(key) => String::from_utf8_lossy(key),
            None => Cow::Borrowed(""),
        }
    }

    /// Offset to commit once this message is done, i.e. the next one to read.
    pub fn next_offset(&self) -> i64 {
        self.offset + 1
    }
}
