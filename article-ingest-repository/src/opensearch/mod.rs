//! OpenSearch implementation of the document index provider.
//!
//! Documents are written through an alias that points at a versioned
//! backing index, created on startup when missing.

mod index_config;
mod provider;

pub use index_config::{get_index_body, IndexConfig, DEFAULT_INDEX_ALIAS};
pub use provider::OpenSearchProvider;
