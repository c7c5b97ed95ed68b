//! Environment-driven settings for the article ingest service.

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use article_ingest_repository::config::{DEFAULT_DB_HOST, DEFAULT_DB_PORT, DEFAULT_MAX_CONNECTIONS};
use article_ingest_repository::opensearch::{IndexConfig, DEFAULT_INDEX_ALIAS};
use article_ingest_repository::PostgresConfig;

use crate::consumer::KafkaConsumerConfig;
use crate::health::DEFAULT_HEALTH_PORT;
use crate::orchestrator::CommitPolicy;
use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// How startup reacts to an unreachable PostgreSQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    #[default]
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl FromStr for ConnectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Ok(Self::FailFast),
            "retry" => Ok(Self::Retry),
            other => Err(format!("unknown connection mode: {}", other)),
        }
    }
}

/// All settings the service reads at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub kafka: KafkaConsumerConfig,
    pub commit_policy: CommitPolicy,
    pub postgres: PostgresConfig,
    pub opensearch_url: String,
    pub index: IndexConfig,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub health_addr: SocketAddr,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `KAFKA_BROKER`: Kafka broker addresses (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: pixiv-group)
    /// - `KAFKA_TOPIC`: Topic to consume (default: crawler-pixiv)
    /// - `KAFKA_USERNAME` / `KAFKA_PASSWORD` / `KAFKA_SSL_CA_PEM`: SASL/SSL (optional)
    /// - `COMMIT_POLICY`: "on-read" or "on-success" (default: on-read)
    /// - `DATABASE_URL`: Full PostgreSQL URL; otherwise built from `DB_USER`,
    ///   `DB_PASS`, `DB_HOST`, `DB_PORT` and `DB_NAME`
    /// - `DB_MAX_CONNECTIONS`: Pool size (default: 5)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `ARTICLE_INDEX`: Index alias name (default: es_article)
    /// - `ARTICLE_INDEX_VERSION`: Index version number (default: 0)
    /// - `CONNECTION_MODE`: "fail-fast" or "retry" (default: fail-fast)
    /// - `CONNECTION_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `HEALTH_PORT`: Port of the health endpoint (default: 3000)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mut kafka = KafkaConsumerConfig::new(
            var("KAFKA_BROKER", crate::consumer::DEFAULT_KAFKA_BROKER),
            var("KAFKA_GROUP_ID", crate::consumer::DEFAULT_KAFKA_GROUP_ID),
            var("KAFKA_TOPIC", crate::consumer::DEFAULT_KAFKA_TOPIC),
        );
        if let (Some(username), Some(password)) = (lookup("KAFKA_USERNAME"), lookup("KAFKA_PASSWORD")) {
            kafka = kafka.with_credentials(username, password);
        }
        if let Some(ca_pem) = lookup("KAFKA_SSL_CA_PEM") {
            kafka = kafka.with_ssl_ca(ca_pem);
        }

        let commit_policy = parse_or_default(&lookup, "COMMIT_POLICY", CommitPolicy::default());
        let connection_mode =
            parse_or_default(&lookup, "CONNECTION_MODE", ConnectionMode::default());
        let retry_interval = Duration::from_secs(parse_or_default(
            &lookup,
            "CONNECTION_RETRY_INTERVAL_SECS",
            DEFAULT_RETRY_INTERVAL_SECS,
        ));

        let postgres = match lookup("DATABASE_URL") {
            Some(url) => PostgresConfig::new(url),
            None => PostgresConfig::from_components(
                &var("DB_USER", ""),
                &var("DB_PASS", ""),
                &var("DB_HOST", DEFAULT_DB_HOST),
                parse_or_default(&lookup, "DB_PORT", DEFAULT_DB_PORT),
                &var("DB_NAME", ""),
            )
            .map_err(|e| {
                IndexingError::config(format!(
                    "Set DATABASE_URL or DB_NAME for the record store: {}",
                    e
                ))
            })?,
        }
        .with_max_connections(parse_or_default(
            &lookup,
            "DB_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        ));

        let index = IndexConfig::new(
            var("ARTICLE_INDEX", DEFAULT_INDEX_ALIAS),
            parse_or_default(&lookup, "ARTICLE_INDEX_VERSION", 0u32),
        );

        let health_port = parse_or_default(&lookup, "HEALTH_PORT", DEFAULT_HEALTH_PORT);

        Ok(Self {
            kafka,
            commit_policy,
            postgres,
            opensearch_url: var("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            index,
            connection_mode,
            retry_interval,
            health_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, health_port)),
        })
    }
}

/// Parse `key` if set, warning and falling back to `default` when it does not parse.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = key, value = %raw, default = ?default, "Invalid value, using default");
            default
        }),
        None => default,
    }
}
