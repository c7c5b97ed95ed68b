//! # Article Ingest Shared
//!
//! This crate defines the data structures shared across the article ingest pipeline.
//! It includes the relational projection of an article (`ArticleRecord`) and the
//! denormalized search projection (`ArticleDocument`) built from the same source event.

pub mod types;

pub use types::article_document::{
    estimated_read_time, profile_url, ArticleDocument, AuthorInfo, InteractionMetrics,
};
pub use types::article_record::{ArticleRecord, Platform, UnknownPlatform};
