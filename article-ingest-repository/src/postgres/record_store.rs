//! PostgreSQL record store.
//!
//! Inserts one row per article into the `article` table and returns the
//! generated identifier.
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use article_ingest_shared::ArticleRecord;

use crate::config::PostgresConfig;
use crate::{RecordStore, RecordStoreError};

const INSERT_ARTICLE: &str = r#"
    INSERT INTO article (
        title, author, platform, summary, content, word_count,
        is_completed, kudos_count, comment_count, language, tags
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    RETURNING id
"#;

/// PostgreSQL-backed record store.
///
/// Holds a `sqlx::PgPool`, so a single instance can be shared behind an `Arc`
/// by any number of callers.
pub struct PostgresRecordStore {
    pool: sqlx::PgPool,
}

impl PostgresRecordStore {
    /// Creates a store over an existing pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the `article` table
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool and verifies the database is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresRecordStore)` - Connected store
    /// * `Err(RecordStoreError)` - If the database cannot be reached
    pub async fn connect(config: &PostgresConfig) -> Result<Self, RecordStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations, creating the `article` table if needed.
    pub async fn migrate(&self) -> Result<(), RecordStoreError> {
        sqlx::migrate!("src/postgres/migrations")
            .run(&self.pool)
            .await?;

        info!("Record store migrations applied");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn create(&self, record: &ArticleRecord) -> Result<i64, RecordStoreError> {
        let id = sqlx::query_scalar::<_, i64>(INSERT_ARTICLE)
            .bind(&record.title)
            .bind(&record.author)
            .bind(record.platform.as_str())
            .bind(&record.summary)
            .bind(&record.content)
            .bind(record.word_count)
            .bind(record.is_completed)
            .bind(record.kudos_count)
            .bind(record.comment_count)
            .bind(&record.language)
            .bind(&record.tags)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_check_violation() => {
                    RecordStoreError::insert_rejected(db.message().to_string())
                }
                other => RecordStoreError::DatabaseError(other),
            })?;

        debug!(id = id, title = %record.title, "Inserted article row");
        Ok(id)
    }
}
