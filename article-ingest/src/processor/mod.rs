//! Processor module for the article ingest pipeline.
//!
//! Decodes message payloads and maps them into articles.

mod article_mapper;
pub mod extract;

pub use article_mapper::{ArticleMapper, MappedArticle, NOVEL_CONTAINER_KEY};
