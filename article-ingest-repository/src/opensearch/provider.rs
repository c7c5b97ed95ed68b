//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `DocumentIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsAliasParts, IndicesExistsParts},
    params::Refresh,
    IndexParts, OpenSearch,
};
use tracing::{debug, error, info};
use url::Url;

use article_ingest_shared::ArticleDocument;

use crate::errors::SearchIndexError;
use crate::interfaces::DocumentIndexProvider;
use crate::opensearch::index_config::{get_index_body, IndexConfig};
use crate::types::IndexOptions;

/// What startup has to do to make the alias writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexBootstrap {
    /// The alias exists, or a concrete index carries the alias name.
    Ready,
    /// Create the versioned index with the alias attached.
    Create,
    /// The versioned index exists but the alias is missing.
    Conflict,
}

impl IndexBootstrap {
    fn plan(alias_exists: bool, concrete_alias_index: bool, versioned_exists: bool) -> Self {
        if alias_exists || concrete_alias_index {
            Self::Ready
        } else if versioned_exists {
            Self::Conflict
        } else {
            Self::Create
        }
    }
}

/// OpenSearch provider implementation.
///
/// Writes article documents through the configured alias.
///
/// # Example
///
/// ```ignore
/// use article_ingest_repository::opensearch::IndexConfig;
/// use article_ingest_repository::IndexOptions;
/// let provider = OpenSearchProvider::new("http://localhost:9200", IndexConfig::default()).await?;
/// provider.ensure_index_exists().await?;
/// provider.index_document(&document, IndexOptions::synchronous()).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and version
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Ping the cluster, failing if it is unreachable.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }
        Ok(())
    }

    fn refresh_param(options: IndexOptions) -> Refresh {
        if options.synchronous_refresh {
            Refresh::True
        } else {
            Refresh::False
        }
    }

    async fn alias_exists(&self) -> Result<bool, SearchIndexError> {
        let alias = self.index_config.alias.as_str();
        let response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }

    async fn index_exists(&self, index_name: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }
}

#[async_trait]
impl DocumentIndexProvider for OpenSearchProvider {
    /// Ensure the versioned index exists and the alias points at it.
    ///
    /// A concrete index already named like the alias is accepted as is.
    /// Existing indices are left untouched, so this is safe to call on every startup.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let alias = self.index_config.alias.as_str();
        let alias_exists = self.alias_exists().await?;
        // An index created by writing straight to the alias name also accepts writes
        let concrete_alias_index = !alias_exists && self.index_exists(alias).await?;
        let index_name = self.index_config.versioned_index_name();
        let versioned_exists =
            !alias_exists && !concrete_alias_index && self.index_exists(&index_name).await?;

        match IndexBootstrap::plan(alias_exists, concrete_alias_index, versioned_exists) {
            IndexBootstrap::Ready => {
                debug!(
                    alias = %alias,
                    concrete_index = concrete_alias_index,
                    "Index alias already writable"
                );
                return Ok(());
            }
            IndexBootstrap::Conflict => {
                return Err(SearchIndexError::index_creation(format!(
                    "Index {} exists but alias {} does not point at it",
                    index_name, alias
                )));
            }
            IndexBootstrap::Create => {}
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(get_index_body(&self.index_config))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Create index {} failed with status {}: {}",
                index_name, status, error_body
            )));
        }

        info!(
            index = %index_name,
            alias = %self.index_config.alias,
            "Created search index"
        );
        Ok(())
    }

    /// Index a document through the alias, letting OpenSearch assign its id.
    async fn index_document(
        &self,
        document: &ArticleDocument,
        options: IndexOptions,
    ) -> Result<(), SearchIndexError> {
        let body = serde_json::to_value(document)
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let response = self
            .client
            .index(IndexParts::Index(&self.index_config.alias))
            .refresh(Self::refresh_param(options))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::rejected(status.as_u16(), error_body));
        }

        debug!(
            article_id = %document.article_id,
            alias = %self.index_config.alias,
            "Document indexed"
        );
        Ok(())
    }
}
