//! Integration tests for the article ingest orchestrator.
//!
//! These tests use the real Orchestrator, mapper and dual writer but mock
//! dependencies (Consumer, RecordStore and DocumentIndexProvider) to ensure
//! reliable testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{timeout, Instant};

use article_ingest::consumer::{Consumer, QueueMessage};
use article_ingest::errors::IngestError;
use article_ingest::loader::DualWriter;
use article_ingest::orchestrator::{CommitPolicy, Orchestrator, OrchestratorConfig};
use article_ingest::processor::ArticleMapper;
use article_ingest_repository::{
    DocumentIndexProvider, IndexOptions, RecordStore, RecordStoreError, SearchIndexError,
};
use article_ingest_shared::{ArticleDocument, ArticleRecord, Platform};

const E2E_PAYLOAD: &str = r#"{"novel":{"12345":{"title":"T","userName":"A","description":"D","content":"C","wordCount":100,"likeCount":5,"commentCount":2,"language":"ja","tags":{"tags":[{"tag":"romance"}]}}}}"#;

// Mock Consumer for testing
struct MockConsumer {
    queue: Mutex<VecDeque<Result<QueueMessage, IngestError>>>,
    committed: Mutex<Vec<(i32, i64)>>,
    error_on_subscribe: bool,
}

impl MockConsumer {
    fn new(items: Vec<Result<QueueMessage, IngestError>>) -> Self {
        Self {
            queue: Mutex::new(items.into()),
            committed: Mutex::new(Vec::new()),
            error_on_subscribe: false,
        }
    }

    fn with_payloads(payloads: &[&str]) -> Self {
        Self::new(
            payloads
                .iter()
                .enumerate()
                .map(|(offset, payload)| Ok(message(offset as i64, payload)))
                .collect(),
        )
    }

    fn with_subscribe_error() -> Self {
        Self {
            error_on_subscribe: true,
            ..Self::new(vec![])
        }
    }

    fn committed_offsets(&self) -> Vec<i64> {
        self.committed
            .lock()
            .unwrap()
            .iter()
            .map(|(_, offset)| *offset)
            .collect()
    }
}

#[async_trait::async_trait]
impl Consumer for MockConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        if self.error_on_subscribe {
            Err(IngestError::KafkaError("Mock subscribe error".to_string()))
        } else {
            Ok(())
        }
    }

    async fn recv(&self) -> Result<Option<QueueMessage>, IngestError> {
        // An exhausted queue ends the loop
        match self.queue.lock().unwrap().pop_front() {
            Some(Ok(message)) => Ok(Some(message)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn commit(&self, message: &QueueMessage) -> Result<(), IngestError> {
        self.committed
            .lock()
            .unwrap()
            .push((message.partition, message.offset));
        Ok(())
    }
}

// Consumer that never yields a message
struct IdleConsumer;

#[async_trait::async_trait]
impl Consumer for IdleConsumer {
    fn subscribe(&self) -> Result<(), IngestError> {
        Ok(())
    }

    async fn recv(&self) -> Result<Option<QueueMessage>, IngestError> {
        std::future::pending().await
    }

    fn commit(&self, _message: &QueueMessage) -> Result<(), IngestError> {
        Ok(())
    }
}

// Mock Record Store for testing
struct MockRecordStore {
    created: Mutex<Vec<ArticleRecord>>,
    next_id: AtomicI64,
    fail: bool,
}

impl MockRecordStore {
    fn new() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn created(&self) -> Vec<ArticleRecord> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordStore for MockRecordStore {
    async fn create(&self, record: &ArticleRecord) -> Result<i64, RecordStoreError> {
        if self.fail {
            return Err(RecordStoreError::insert_rejected("Mock insert error"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = record.clone();
        stored.id = Some(id);
        self.created.lock().unwrap().push(stored);
        Ok(id)
    }
}

// Mock Document Index for testing
struct MockIndexProvider {
    indexed: Mutex<Vec<(ArticleDocument, IndexOptions)>>,
    fail: bool,
}

impl MockIndexProvider {
    fn new() -> Self {
        Self {
            indexed: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn indexed(&self) -> Vec<ArticleDocument> {
        self.indexed
            .lock()
            .unwrap()
            .iter()
            .map(|(doc, _)| doc.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl DocumentIndexProvider for MockIndexProvider {
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn index_document(
        &self,
        document: &ArticleDocument,
        options: IndexOptions,
    ) -> Result<(), SearchIndexError> {
        if self.fail {
            return Err(SearchIndexError::rejected(400, "mapper_parsing_exception"));
        }
        self.indexed
            .lock()
            .unwrap()
            .push((document.clone(), options));
        Ok(())
    }
}

fn message(offset: i64, payload: &str) -> QueueMessage {
    QueueMessage::new("crawler-pixiv", 0, offset, payload.as_bytes().to_vec())
}

/// Helper to create a test orchestrator with mocked dependencies
fn create_test_orchestrator(
    consumer: Arc<MockConsumer>,
    store: Arc<MockRecordStore>,
    index: Arc<MockIndexProvider>,
    commit_policy: CommitPolicy,
) -> Orchestrator {
    let writer = DualWriter::new(store, index);
    let config = OrchestratorConfig {
        commit_policy,
        ..OrchestratorConfig::default()
    };
    Orchestrator::with_config(consumer, ArticleMapper::new(), writer, config)
}

async fn run_to_end(orchestrator: &mut Orchestrator) {
    let result = timeout(Duration::from_secs(30), orchestrator.run()).await;
    assert!(result.is_ok(), "Orchestrator should complete");
    assert!(result.unwrap().is_ok(), "Orchestrator should not fail");
}

#[tokio::test]
async fn test_end_to_end_payload() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[E2E_PAYLOAD]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::new());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnRead,
    );

    run_to_end(&mut orchestrator).await;

    let records = store.created();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, Some(1));
    assert_eq!(record.title, "T");
    assert_eq!(record.author, "A");
    assert_eq!(record.platform, Platform::Pixiv);
    assert_eq!(record.summary, "D");
    assert_eq!(record.content, "C");
    assert_eq!(record.word_count, 100);
    assert_eq!(record.kudos_count, 5);
    assert_eq!(record.comment_count, 2);
    assert_eq!(record.language, "ja");
    assert_eq!(record.tags, r#"["romance"]"#);
    assert!(!record.is_completed);

    let documents = index.indexed();
    assert_eq!(documents.len(), 1);
    let document = &documents[0];
    assert_eq!(document.article_id, "12345");
    assert_eq!(document.tags, vec!["romance".to_string()]);
    assert_eq!(document.estimated_read_time, "0分");
    assert_eq!(document.likes, 5);

    // Index writes ask for synchronous refresh
    let (_, options) = index.indexed.lock().unwrap()[0].clone();
    assert!(options.synchronous_refresh);

    assert_eq!(consumer.committed_offsets(), vec![0]);

    let progress = orchestrator.counters().snapshot();
    assert_eq!(progress.messages_consumed, 1);
    assert_eq!(progress.records_stored, 1);
    assert_eq!(progress.documents_indexed, 1);
    assert_eq!(progress.failures, 0);
}

#[tokio::test]
async fn test_empty_container_writes_nothing() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[r#"{"novel":{}}"#]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::new());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnRead,
    );

    run_to_end(&mut orchestrator).await;

    assert!(store.created().is_empty());
    assert!(index.indexed().is_empty());
    assert_eq!(orchestrator.counters().snapshot().failures, 1);
}

#[tokio::test]
async fn test_bad_messages_do_not_stop_the_loop() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[
        "not json",
        r#"{"illust":{}}"#,
        r#"{"novel":{"1":{"title":"A"},"2":{"title":"B"}}}"#,
        E2E_PAYLOAD,
    ]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::new());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnRead,
    );

    run_to_end(&mut orchestrator).await;

    assert_eq!(store.created().len(), 1);
    assert_eq!(index.indexed().len(), 1);
    assert_eq!(consumer.committed_offsets(), vec![0, 1, 2, 3]);

    let progress = orchestrator.counters().snapshot();
    assert_eq!(progress.messages_consumed, 4);
    assert_eq!(progress.failures, 3);
}

#[tokio::test(start_paused = true)]
async fn test_read_error_backs_off_then_continues() {
    let consumer = Arc::new(MockConsumer::new(vec![
        Err(IngestError::kafka("broker transport failure")),
        Ok(message(7, E2E_PAYLOAD)),
    ]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::new());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnRead,
    );

    let started = Instant::now();
    run_to_end(&mut orchestrator).await;

    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(store.created().len(), 1);
    assert_eq!(index.indexed().len(), 1);
    assert_eq!(consumer.committed_offsets(), vec![7]);
}

#[tokio::test]
async fn test_same_message_twice_creates_two_records() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[E2E_PAYLOAD, E2E_PAYLOAD]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::new());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnRead,
    );

    run_to_end(&mut orchestrator).await;

    let ids: Vec<Option<i64>> = store.created().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
    assert_eq!(index.indexed().len(), 2);
}

#[tokio::test]
async fn test_record_failure_still_indexes() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[E2E_PAYLOAD]));
    let store = Arc::new(MockRecordStore::failing());
    let index = Arc::new(MockIndexProvider::new());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnRead,
    );

    run_to_end(&mut orchestrator).await;

    assert!(store.created().is_empty());
    assert_eq!(index.indexed().len(), 1);

    let progress = orchestrator.counters().snapshot();
    assert_eq!(progress.records_stored, 0);
    assert_eq!(progress.documents_indexed, 1);
    assert_eq!(progress.failures, 1);
}

#[tokio::test]
async fn test_index_failure_keeps_record() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[E2E_PAYLOAD]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::failing());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnRead,
    );

    run_to_end(&mut orchestrator).await;

    assert_eq!(store.created().len(), 1);
    assert!(index.indexed().is_empty());
    assert_eq!(consumer.committed_offsets(), vec![0]);
}

#[tokio::test]
async fn test_on_success_policy_skips_commit_of_failures() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[
        E2E_PAYLOAD,
        "not json",
        r#"{"novel":{}}"#,
    ]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::new());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnSuccess,
    );

    run_to_end(&mut orchestrator).await;

    assert_eq!(consumer.committed_offsets(), vec![0]);
}

#[tokio::test]
async fn test_on_success_policy_skips_commit_of_partial_write() {
    let consumer = Arc::new(MockConsumer::with_payloads(&[E2E_PAYLOAD]));
    let store = Arc::new(MockRecordStore::new());
    let index = Arc::new(MockIndexProvider::failing());
    let mut orchestrator = create_test_orchestrator(
        consumer.clone(),
        store.clone(),
        index.clone(),
        CommitPolicy::OnSuccess,
    );

    run_to_end(&mut orchestrator).await;

    assert_eq!(store.created().len(), 1);
    assert!(consumer.committed_offsets().is_empty());
}

#[tokio::test]
async fn test_orchestrator_error_handling() {
    let consumer = Arc::new(MockConsumer::with_subscribe_error());
    let mut orchestrator = create_test_orchestrator(
        consumer,
        Arc::new(MockRecordStore::new()),
        Arc::new(MockIndexProvider::new()),
        CommitPolicy::OnRead,
    );

    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(result.is_ok(), "Orchestrator should complete");

    match result.unwrap() {
        Err(IngestError::KafkaError(msg)) => assert_eq!(msg, "Mock subscribe error"),
        other => panic!("Expected KafkaError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_orchestrator_shutdown() {
    let writer = DualWriter::new(
        Arc::new(MockRecordStore::new()),
        Arc::new(MockIndexProvider::new()),
    );
    let mut orchestrator = Orchestrator::new(Arc::new(IdleConsumer), ArticleMapper::new(), writer);
    let shutdown = orchestrator.shutdown_handle();

    let shutdown_task = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = shutdown.send(());
    });

    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(result.is_ok(), "Orchestrator should stop on shutdown");
    assert!(result.unwrap().is_ok());
    assert!(shutdown_task.await.is_ok());
}

#[tokio::test]
async fn test_shutdown_before_run() {
    let writer = DualWriter::new(
        Arc::new(MockRecordStore::new()),
        Arc::new(MockIndexProvider::new()),
    );
    let mut orchestrator = Orchestrator::new(Arc::new(IdleConsumer), ArticleMapper::new(), writer);

    orchestrator.shutdown();

    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(result.is_ok(), "Orchestrator should stop on shutdown");
    assert!(result.unwrap().is_ok());
}
