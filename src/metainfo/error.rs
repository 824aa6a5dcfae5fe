use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when building or reading torrent metainfo.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The torrent contains invalid bencode, or encoding failed.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value or type.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// The number of piece hashes does not cover the content.
    #[error("expected {expected} piece hashes, got {actual}")]
    PieceCountMismatch { expected: u64, actual: u64 },

    /// The info hash has an invalid length or encoding.
    #[error("invalid info hash")]
    InvalidInfoHash,
}
