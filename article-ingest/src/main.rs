//! Article Ingest Main Entry Point
//!
//! Consumes crawled novels from Kafka and writes them to PostgreSQL and
//! OpenSearch, serving a health endpoint alongside.

use article_ingest::{health, Dependencies, IndexingError, Settings};
use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("article_ingest=info,article_ingest_repository=info"));

    let json_output = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        // Structured logging for log shippers
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "article-ingest",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "article-ingest",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting article ingest");

    let settings = Settings::from_env()?;

    // The health endpoint reports liveness while dependencies are still connecting
    health::spawn_health_server(settings.health_addr)
        .await
        .map_err(|e| {
            error!(error = %e, addr = %settings.health_addr, "Failed to bind health server");
            IndexingError::config(format!(
                "Failed to bind health server on {}: {}",
                settings.health_addr, e
            ))
        })?;

    let mut deps = match Dependencies::new(&settings).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run().await {
        Ok(()) => {
            info!("Article ingest stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Article ingest failed");
            Err(e.into())
        }
    }
}
