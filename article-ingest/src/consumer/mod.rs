//! Consumer module for the article ingest pipeline.
//!
//! Provides the queue abstraction the orchestrator reads from, and its Kafka
//! implementation.

mod kafka_consumer;
mod messages;

use async_trait::async_trait;

use crate::errors::IngestError;

pub use kafka_consumer::{
    KafkaConsumer, KafkaConsumerConfig, DEFAULT_KAFKA_BROKER, DEFAULT_KAFKA_GROUP_ID,
    DEFAULT_KAFKA_TOPIC,
};
pub use messages::QueueMessage;

/// A source of queue messages with explicit offset commits.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Subscribe to the configured topic.
    fn subscribe(&self) -> Result<(), IngestError>;

    /// Wait for the next message.
    ///
    /// `Ok(None)` means the source is exhausted and the loop should stop. A live
    /// queue never returns it.
    async fn recv(&self) -> Result<Option<QueueMessage>, IngestError>;

    /// Commit the offset following `message` for its topic and partition.
    fn commit(&self, message: &QueueMessage) -> Result<(), IngestError>;
}
