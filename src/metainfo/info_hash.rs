use super::error::MetainfoError;
use sha1::{Digest, Sha1};
use std::fmt;

/// SHA-1 of a torrent's bencoded info dictionary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Hashes raw bencoded info dictionary bytes.
    pub fn from_info_bytes(raw_info: &[u8]) -> Self {
        InfoHash(Sha1::digest(raw_info).into())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetainfoError> {
        <[u8; 20]>::try_from(bytes)
            .map(InfoHash)
            .map_err(|_| MetainfoError::InvalidInfoHash)
    }

    pub fn from_hex(s: &str) -> Result<Self, MetainfoError> {
        let bytes = hex::decode(s).map_err(|_| MetainfoError::InvalidInfoHash)?;
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
