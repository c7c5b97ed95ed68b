//! Dependency initialization and wiring for the article ingest service.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use article_ingest_repository::{
    DocumentIndexProvider, IndexConfig, OpenSearchProvider, PostgresRecordStore,
};

use crate::config::{ConnectionMode, Settings};
use crate::consumer::KafkaConsumer;
use crate::loader::DualWriter;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::processor::ArticleMapper;
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Connect to every backend and wire the orchestrator.
    ///
    /// Applies record store migrations and, when OpenSearch answers, makes sure
    /// the search index exists before the first message is read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If PostgreSQL or Kafka cannot be set up (PostgreSQL
    ///   connection failures only in fail-fast mode)
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            kafka_broker = %settings.kafka.brokers,
            kafka_group_id = %settings.kafka.group_id,
            kafka_topic = %settings.kafka.topic,
            database_url = %settings.postgres.redacted_url(),
            opensearch_url = %settings.opensearch_url,
            index_alias = %settings.index.alias,
            commit_policy = %settings.commit_policy,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let record_store = connect_with_retry(
            "PostgreSQL",
            settings.connection_mode,
            settings.retry_interval,
            || PostgresRecordStore::connect(&settings.postgres),
        )
        .await?;

        record_store
            .migrate()
            .await
            .map_err(|e| IndexingError::config(format!("Failed to migrate record store: {}", e)))?;

        info!("PostgreSQL connection established");

        let search_provider = connect_search_index(&settings.opensearch_url, settings.index.clone())
            .await?;

        let consumer = KafkaConsumer::new(&settings.kafka).map_err(|e| {
            IndexingError::config(format!("Failed to create Kafka consumer: {}", e))
        })?;

        info!("Kafka consumer created");

        let writer = DualWriter::new(Arc::new(record_store), Arc::new(search_provider));

        let orchestrator = Orchestrator::with_config(
            Arc::new(consumer),
            ArticleMapper::new(),
            writer,
            OrchestratorConfig {
                commit_policy: settings.commit_policy,
                ..OrchestratorConfig::default()
            },
        );

        Ok(Self { orchestrator })
    }
}

/// Build the OpenSearch provider and bootstrap the index when the cluster answers.
///
/// An unreachable cluster or a failed bootstrap does not stop startup: records
/// keep flowing to PostgreSQL and each failed index write is logged by the writer.
/// Only an unusable URL is fatal.
async fn connect_search_index(
    url: &str,
    index: IndexConfig,
) -> Result<OpenSearchProvider, IndexingError> {
    let provider = OpenSearchProvider::new(url, index)
        .await
        .map_err(|e| IndexingError::config(format!("Invalid OpenSearch settings: {}", e)))?;

    if let Err(e) = provider.ping().await {
        warn!(
            error = %e,
            opensearch_url = %url,
            "OpenSearch unreachable, skipping index bootstrap"
        );
        return Ok(provider);
    }

    info!("OpenSearch connection established");

    if let Err(e) = provider.ensure_index_exists().await {
        warn!(error = %e, "Failed to ensure index exists, index writes may fail");
    }

    Ok(provider)
}

/// Run `connect` until it succeeds, or once in fail-fast mode.
async fn connect_with_retry<T, E, F, Fut>(
    backend: &str,
    mode: ConnectionMode,
    retry_interval: Duration,
    mut connect: F,
) -> Result<T, IndexingError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    loop {
        match connect().await {
            Ok(connected) => return Ok(connected),
            Err(e) => match mode {
                ConnectionMode::FailFast => {
                    return Err(IndexingError::config(format!(
                        "Failed to connect to {}: {}",
                        backend, e
                    )));
                }
                ConnectionMode::Retry => {
                    warn!(
                        backend = backend,
                        error = %e,
                        retry_interval_secs = retry_interval.as_secs(),
                        "Failed to connect, retrying..."
                    );
                    sleep(retry_interval).await;
                }
            },
        }
    }
}
