//! Orchestrator module for the article ingest pipeline.
//!
//! Coordinates the consumer, mapper, and dual writer. Messages are handled one
//! at a time: read, decode, map, write, log, commit.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use crate::consumer::{Consumer, QueueMessage};
use crate::errors::IngestError;
use crate::loader::DualWriter;
use crate::processor::ArticleMapper;

/// Pause after a failed queue read before trying again.
pub const DEFAULT_READ_ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Interval between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// When a message's offset is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Commit after every processing cycle, whatever its outcome.
    /// A message that failed is not redelivered.
    #[default]
    OnRead,
    /// Commit only when decode, mapping and both writes succeeded.
    OnSuccess,
}

impl CommitPolicy {
    fn should_commit(self, processed_ok: bool) -> bool {
        match self {
            CommitPolicy::OnRead => true,
            CommitPolicy::OnSuccess => processed_ok,
        }
    }
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitPolicy::OnRead => f.write_str("on-read"),
            CommitPolicy::OnSuccess => f.write_str("on-success"),
        }
    }
}

impl FromStr for CommitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on-read" | "on_read" | "onread" => Ok(Self::OnRead),
            "on-success" | "on_success" | "onsuccess" => Ok(Self::OnSuccess),
            other => Err(format!("unknown commit policy: {}", other)),
        }
    }
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Pause after a queue read error.
    pub read_error_backoff: Duration,
    /// When offsets are committed.
    pub commit_policy: CommitPolicy,
    /// Interval between progress log lines.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            read_error_backoff: DEFAULT_READ_ERROR_BACKOFF,
            commit_policy: CommitPolicy::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Counters kept since startup.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    /// Messages read from the queue.
    pub messages_consumed: AtomicU64,
    /// Rows created in the record store.
    pub records_stored: AtomicU64,
    /// Documents accepted by the index.
    pub documents_indexed: AtomicU64,
    /// Messages whose processing failed at any stage.
    pub failures: AtomicU64,
}

/// Point-in-time copy of [`ProgressCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub messages_consumed: u64,
    pub records_stored: u64,
    pub documents_indexed: u64,
    pub failures: u64,
}

impl ProgressCounters {
    /// Read all counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            messages_consumed: self.messages_consumed.load(Ordering::Relaxed),
            records_stored: self.records_stored.load(Ordering::Relaxed),
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Orchestrator that runs the consume loop.
///
/// The orchestrator:
/// - Reads one message at a time and finishes it before reading the next
/// - Backs off after queue read errors and keeps going
/// - Skips messages that fail to decode, map or write, logging why
/// - Commits offsets according to its [`CommitPolicy`]
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    mapper: ArticleMapper,
    writer: DualWriter,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
    counters: Arc<ProgressCounters>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: Arc<dyn Consumer>, mapper: ArticleMapper, writer: DualWriter) -> Self {
        Self::with_config(consumer, mapper, writer, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        mapper: ArticleMapper,
        writer: DualWriter,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Self {
            consumer,
            mapper,
            writer,
            config,
            shutdown_tx,
            shutdown_rx,
            counters: Arc::new(ProgressCounters::default()),
        }
    }

    /// Counters shared with the running loop.
    pub fn counters(&self) -> Arc<ProgressCounters> {
        Arc::clone(&self.counters)
    }

    /// A handle that stops the loop when sent to.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Trigger a graceful shutdown.
    ///
    /// Takes effect even if sent before [`Orchestrator::run`] starts.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Run the consume loop.
    ///
    /// Blocks until a shutdown signal is received or the consumer reports its
    /// stream has ended. Only a failed subscription is returned as an error;
    /// everything after that is per-message and logged.
    #[instrument(skip(self), fields(commit_policy = %self.config.commit_policy))]
    pub async fn run(&mut self) -> Result<(), IngestError> {
        info!("Starting article ingest orchestrator");

        self.consumer.subscribe()?;

        let mut progress_timer = interval(self.config.progress_interval);
        progress_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Skip the first tick immediately
        progress_timer.tick().await;

        info!("Ready to process messages from Kafka");

        loop {
            tokio::select! {
                received = self.consumer.recv() => {
                    match received {
                        Ok(Some(message)) => self.handle_message(message).await,
                        Ok(None) => {
                            info!("Consumer stream ended");
                            break;
                        }
                        Err(e) => {
                            error!(
                                error = %e,
                                backoff_secs = self.config.read_error_backoff.as_secs_f64(),
                                "Failed to read message, backing off"
                            );
                            tokio::select! {
                                _ = sleep(self.config.read_error_backoff) => {}
                                _ = self.shutdown_rx.recv() => {
                                    info!("Received shutdown signal");
                                    break;
                                }
                            }
                        }
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C, shutting down");
                    break;
                }
                _ = progress_timer.tick() => {
                    self.log_progress("Processing progress");
                }
            }
        }

        self.log_progress("Orchestrator shutdown complete");
        Ok(())
    }

    /// Process one message and commit its offset per the commit policy.
    ///
    /// Never fails: every error is logged and counted.
    pub async fn handle_message(&self, message: QueueMessage) {
        self.counters
            .messages_consumed
            .fetch_add(1, Ordering::Relaxed);

        info!(
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            key = %message.key_str(),
            msg_len = message.payload.len(),
            "Received message from Kafka"
        );

        let processed_ok = match self.process(&message).await {
            Ok(id) => {
                info!(
                    partition = message.partition,
                    offset = message.offset,
                    id = id,
                    "Article ingested"
                );
                true
            }
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Failed to process message"
                );
                false
            }
        };

        if self.config.commit_policy.should_commit(processed_ok) {
            if let Err(e) = self.consumer.commit(&message) {
                error!(
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Failed to commit offset"
                );
            }
        } else {
            warn!(
                partition = message.partition,
                offset = message.offset,
                "Not committing offset due to processing failure"
            );
        }
    }

    /// Decode, map and write one message, returning the record id.
    async fn process(&self, message: &QueueMessage) -> Result<i64, IngestError> {
        let payload = self.mapper.decode(&message.payload)?;
        let mut article = self.mapper.map_payload(&payload)?;

        let outcome = self
            .writer
            .write(&mut article.record, &article.document)
            .await;

        if outcome.record.is_ok() {
            self.counters.records_stored.fetch_add(1, Ordering::Relaxed);
        }
        if outcome.index.is_ok() {
            self.counters
                .documents_indexed
                .fetch_add(1, Ordering::Relaxed);
        }

        outcome.into_result()
    }

    fn log_progress(&self, msg: &'static str) {
        let snapshot = self.counters.snapshot();
        info!(
            messages_consumed = snapshot.messages_consumed,
            records_stored = snapshot.records_stored,
            documents_indexed = snapshot.documents_indexed,
            failures = snapshot.failures,
            "{}",
            msg
        );
    }
}
