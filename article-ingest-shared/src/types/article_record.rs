//! Article record types for the relational store.
//!
//! This module defines the normalized row that is persisted for every
//! successfully mapped message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source platform an article was crawled from.
///
/// The stored tags are fixed by the `article` table's CHECK constraint, which is
/// why `Pixiv` keeps its capitalisation while the others are lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "ao3")]
    Ao3,
    #[serde(rename = "Pixiv")]
    Pixiv,
    #[serde(rename = "lofter")]
    Lofter,
    #[serde(rename = "weibo")]
    Weibo,
}

impl Platform {
    /// All platforms accepted by the record store.
    pub const ALL: [Platform; 4] = [
        Platform::Ao3,
        Platform::Pixiv,
        Platform::Lofter,
        Platform::Weibo,
    ];

    /// The tag stored in the `platform` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ao3 => "ao3",
            Platform::Pixiv => "Pixiv",
            Platform::Lofter => "lofter",
            Platform::Weibo => "weibo",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the stored platform tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform tag: {}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// Relational projection of a crawled article.
///
/// Numeric fields default to zero and string fields to empty when the source
/// payload lacks them. `tags` holds a JSON array of tag strings (or is empty
/// when the payload carried no tag list).
///
/// `id` is `None` until the record store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub platform: Platform,
    pub summary: String,
    pub content: String,
    pub word_count: i64,
    pub is_completed: bool,
    pub kudos_count: i64,
    pub comment_count: i64,
    pub language: String,
    pub tags: String,
}

impl ArticleRecord {
    /// Create an empty, unsaved record for the given platform.
    ///
    /// # Example
    ///
    /// ```
    /// use article_ingest_shared::{ArticleRecord, Platform};
    ///
    /// let record = ArticleRecord::new(Platform::Pixiv);
    /// assert!(record.id.is_none());
    /// assert_eq!(record.word_count, 0);
    /// ```
    pub fn new(platform: Platform) -> Self {
        Self {
            id: None,
            title: String::new(),
            author: String::new(),
            platform,
            summary: String::new(),
            content: String::new(),
            word_count: 0,
            is_completed: false,
            kudos_count: 0,
            comment_count: 0,
            language: String::new(),
            tags: String::new(),
        }
    }

    /// Whether the record store has assigned an identifier.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
