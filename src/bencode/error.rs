use thiserror::Error;

/// Errors produced while reading or writing bencode.
#[derive(Debug, Error)]
pub enum BencodeError {
    #[error("input ended inside a value")]
    UnexpectedEof,

    /// An integer that is empty, non-numeric, out of range, or not in
    /// canonical form.
    #[error("malformed integer: {0}")]
    InvalidInteger(String),

    #[error("malformed byte string length")]
    InvalidStringLength,

    #[error("unexpected byte {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    /// Dictionary keys must be unique and in ascending bytewise order.
    #[error("dictionary key {0:?} is out of order or repeated")]
    UnsortedKeys(String),

    #[error("data remains after the top-level value")]
    TrailingData,

    #[error("values nested deeper than the decoder allows")]
    NestingTooDeep,

    /// The writer passed to [`encode_to`](super::encode_to) failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}
