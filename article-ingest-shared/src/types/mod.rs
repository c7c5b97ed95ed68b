//! This module defines the core data structures used across the article ingest pipeline.
//! It re-exports the record and document types.

pub mod article_document;
pub mod article_record;

pub use article_document::ArticleDocument;
pub use article_record::{ArticleRecord, Platform};
