//! Kafka consumer implementation for the article ingest pipeline.
//!
//! Reads crawled novel messages one at a time and commits offsets explicitly.

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer as _, StreamConsumer},
    message::Message as _,
    Offset, TopicPartitionList,
};
use tracing::{debug, info, instrument};

use crate::consumer::{Consumer, QueueMessage};
use crate::errors::IngestError;

/// Default Kafka broker address.
pub const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";

/// Default Kafka consumer group ID.
pub const DEFAULT_KAFKA_GROUP_ID: &str = "pixiv-group";

/// Default topic carrying crawled Pixiv novels.
pub const DEFAULT_KAFKA_TOPIC: &str = "crawler-pixiv";

/// Largest fetch the client asks the broker for, in bytes.
const MAX_FETCH_BYTES: &str = "10000000";

/// Connection settings for the Kafka consumer.
#[derive(Debug, Clone)]
pub struct KafkaConsumerConfig {
    /// Broker addresses (comma-separated).
    pub brokers: String,
    /// Consumer group ID.
    pub group_id: String,
    /// Topic to subscribe to.
    pub topic: String,
    /// SASL username (enables SASL/SSL if set together with the password)
    pub username: Option<String>,
    /// SASL password
    pub password: Option<String>,
    /// Custom CA certificate in PEM format
    pub ssl_ca_pem: Option<String>,
}

impl KafkaConsumerConfig {
    /// Create a plaintext configuration.
    pub fn new(
        brokers: impl Into<String>,
        group_id: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            topic: topic.into(),
            username: None,
            password: None,
            ssl_ca_pem: None,
        }
    }

    /// Set SASL credentials.
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    /// Set custom CA certificate.
    pub fn with_ssl_ca(mut self, ca_pem: String) -> Self {
        self.ssl_ca_pem = Some(ca_pem);
        self
    }

    /// Build the librdkafka client configuration.
    ///
    /// Auto-commit is disabled; the orchestrator decides when offsets are committed.
    pub fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();

        client_config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .set("fetch.min.bytes", "1")
            .set("fetch.max.bytes", MAX_FETCH_BYTES)
            .set("max.partition.fetch.bytes", MAX_FETCH_BYTES);

        // SASL/SSL for managed Kafka, plaintext for local development
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            client_config
                .set("security.protocol", "SASL_SSL")
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);

            if let Some(ca_pem) = &self.ssl_ca_pem {
                client_config.set("ssl.ca.pem", ca_pem);
            }
        }

        client_config
    }
}

impl Default for KafkaConsumerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_KAFKA_BROKER, DEFAULT_KAFKA_GROUP_ID, DEFAULT_KAFKA_TOPIC)
    }
}

/// Kafka consumer for crawled novel messages.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaConsumer {
    /// Create a new Kafka consumer.
    ///
    /// # Arguments
    ///
    /// * `config` - Broker, group, topic and optional SASL settings
    ///
    /// # Returns
    ///
    /// * `Ok(KafkaConsumer)` - A new consumer instance
    /// * `Err(IngestError)` - If consumer creation fails
    pub fn new(config: &KafkaConsumerConfig) -> Result<Self, IngestError> {
        let consumer: StreamConsumer = config.client_config().create()?;

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topic = %config.topic,
            sasl = config.username.is_some(),
            "Created Kafka consumer"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl Consumer for KafkaConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        self.consumer.subscribe(&[self.topic.as_str()])?;

        info!(topic = %self.topic, "Subscribed to Kafka topic");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn recv(&self) -> Result<Option<QueueMessage>, IngestError> {
        let msg = self.consumer.recv().await?;

        let mut message = QueueMessage::new(
            msg.topic(),
            msg.partition(),
            msg.offset(),
            msg.payload().unwrap_or_default(),
        );
        if let Some(key) = msg.key() {
            message = message.with_key(key);
        }

        Ok(Some(message))
    }

    fn commit(&self, message: &QueueMessage) -> Result<(), IngestError> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &message.topic,
            message.partition,
            Offset::Offset(message.next_offset()),
        )?;
        self.consumer.commit(&tpl, CommitMode::Async)?;

        debug!(
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            "Committed offset"
        );
        Ok(())
    }
}
