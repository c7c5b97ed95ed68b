//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the article search index.

use serde_json::{json, Value};

/// The default alias of the article index.
pub const DEFAULT_INDEX_ALIAS: &str = "es_article";

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The alias name for the search index (used for all writes).
    pub alias: String,
    /// The version number for the backing index (e.g., 0 for "es_article_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version` - The version number
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }

    /// Get the versioned name of the backing index, e.g. `es_article_v0`.
    pub fn versioned_index_name(&self) -> String {
        format!("{}_v{}", self.alias, self.version)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_ALIAS, 0)
    }
}

/// Get the index creation body for the article index.
///
/// The body includes:
/// - **text** fields for title and content
/// - **keyword** fields for identifiers, tags, language and status
/// - **object** mappings for `author` and `interaction`
/// - the alias pointing at the new index
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
pub fn get_index_body(config: &IndexConfig) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "aliases": {
            (config.alias.as_str()): {}
        },
        "mappings": {
            "properties": {
                "article_id": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "fields": {
                        "raw": { "type": "keyword" }
                    }
                },
                "author": {
                    "properties": {
                        "name": { "type": "keyword" },
                        "profile_url": { "type": "keyword", "index": false },
                        "status": { "type": "keyword" }
                    }
                },
                "cover_image": { "type": "keyword", "index": false },
                "content": { "type": "text" },
                "word_count": { "type": "long" },
                "language": { "type": "keyword" },
                "status": { "type": "keyword" },
                "chapters": { "type": "object", "enabled": false },
                "likes": { "type": "long" },
                "comments_count": { "type": "long" },
                "comments": { "type": "object", "enabled": false },
                "tags": { "type": "keyword" },
                "published_at": { "type": "keyword" },
                "estimated_read_time": { "type": "keyword" },
                "interaction": {
                    "properties": {
                        "reaction_count": { "type": "long" },
                        "likes_count": { "type": "long" },
                        "views_count": { "type": "long" }
                    }
                },
                "indexed_at": { "type": "date" }
            }
        }
    })
}
