//! Request option types for document index operations.

/// Options for a single index request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Refresh the affected shards before returning so the document is
    /// immediately searchable.
    pub synchronous_refresh: bool,
}

impl IndexOptions {
    /// Options requesting immediate visibility.
    pub fn synchronous() -> Self {
        Self {
            synchronous_refresh: true,
        }
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::synchronous()
    }
}
