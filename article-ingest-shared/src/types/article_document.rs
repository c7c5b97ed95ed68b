//! Article document types for the search index.
//!
//! This module defines the document structure that is indexed in the search engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base URL for author profile links.
pub const PROFILE_URL_BASE: &str = "https://www.pixiv.net/users/";

/// Author status written to every indexed document.
pub const AUTHOR_STATUS_ACTIVE: &str = "active";

/// Article status written to every indexed document.
pub const ARTICLE_STATUS_COMPLETED: &str = "completed";

/// Unit suffix appended to the estimated read time (minutes).
pub const READ_TIME_UNIT: &str = "分";

/// Author sub-object of an indexed article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorInfo {
    pub name: String,
    pub profile_url: String,
    pub status: String,
}

impl AuthorInfo {
    /// Build the author block, deriving the profile URL from the user id.
    pub fn new(name: impl Into<String>, user_id: &str) -> Self {
        Self {
            name: name.into(),
            profile_url: profile_url(user_id),
            status: AUTHOR_STATUS_ACTIVE.to_string(),
        }
    }
}

/// Interaction counters of an indexed article.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InteractionMetrics {
    /// Always zero; the source carries no reaction counter.
    pub reaction_count: i64,
    pub likes_count: i64,
    pub views_count: i64,
}

/// Document representation for the search index.
///
/// This struct is the denormalized projection of one crawled article. It is built
/// independently of the relational `ArticleRecord` and never references the
/// record's store-assigned identifier.
///
/// # Fields
///
/// - `article_id`: Identifier of the article on the source platform
/// - `tags`: Tag strings, same collection as `ArticleRecord::tags`
/// - `published_at`: Upload date exactly as the source reported it
/// - `estimated_read_time`: Whole minutes with a unit suffix, e.g. `"12分"`
/// - `chapters` / `comments`: Placeholders, always empty
/// - `indexed_at`: Timestamp when the document was built
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleDocument {
    pub article_id: String,
    pub title: String,
    pub author: AuthorInfo,
    pub cover_image: String,
    pub content: String,
    pub word_count: i64,
    pub language: String,
    pub status: String,
    pub chapters: Vec<Value>,
    pub likes: i64,
    pub comments_count: i64,
    pub comments: Vec<Value>,
    pub tags: Vec<String>,
    pub published_at: String,
    pub estimated_read_time: String,
    pub interaction: InteractionMetrics,
    pub indexed_at: DateTime<Utc>,
}

impl ArticleDocument {
    /// Create a document with empty content fields and placeholder lists.
    ///
    /// # Example
    ///
    /// ```
    /// use article_ingest_shared::{ArticleDocument, AuthorInfo};
    ///
    /// let doc = ArticleDocument::new("12345", "Title", AuthorInfo::new("A", "42"));
    /// assert!(doc.chapters.is_empty());
    /// assert_eq!(doc.estimated_read_time, "0分");
    /// ```
    pub fn new(article_id: impl Into<String>, title: impl Into<String>, author: AuthorInfo) -> Self {
        Self {
            article_id: article_id.into(),
            title: title.into(),
            author,
            cover_image: String::new(),
            content: String::new(),
            word_count: 0,
            language: String::new(),
            status: ARTICLE_STATUS_COMPLETED.to_string(),
            chapters: Vec::new(),
            likes: 0,
            comments_count: 0,
            comments: Vec::new(),
            tags: Vec::new(),
            published_at: String::new(),
            estimated_read_time: estimated_read_time(0),
            interaction: InteractionMetrics::default(),
            indexed_at: Utc::now(),
        }
    }
}

/// Build an author profile URL from a user identifier.
pub fn profile_url(user_id: &str) -> String {
    format!("{}{}", PROFILE_URL_BASE, user_id)
}

/// Format a reading time given in seconds as whole minutes with the unit suffix.
///
/// Integer division truncates, so anything under a minute reads as `"0分"`.
pub fn estimated_read_time(reading_time_secs: i64) -> String {
    format!("{}{}", reading_time_secs / 60, READ_TIME_UNIT)
}
