use crate::constants::{CREATED_BY, READ_CHUNK_SIZE};

/// Settings shared by every run of a [`TorrentCreator`](super::TorrentCreator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorConfig {
    /// Bytes read per call while hashing.
    pub chunk_size: usize,
    /// Default `created by` value. A request may override it; an empty
    /// string omits the key.
    pub created_by: String,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        Self {
            chunk_size: READ_CHUNK_SIZE,
            created_by: CREATED_BY.to_string(),
        }
    }
}
