//! PostgreSQL implementation of the record store.
//!
//! The schema lives in `migrations/` and is embedded into the binary; call
//! [`PostgresRecordStore::migrate`] once at startup.

mod record_store;

pub use record_store::PostgresRecordStore;
