//! Interface definitions for the two sinks of the pipeline.
//!
//! `RecordStore` and `DocumentIndexProvider` allow dependency injection and
//! swappable backends; the pipeline only ever talks to these traits.

mod document_index_provider;
mod record_store;

pub use document_index_provider::DocumentIndexProvider;
pub use record_store::RecordStore;
