use std::fmt;
use std::io::SeekFrom;
use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::trace;

use super::plan::{PiecePlan, PieceRange, PieceRanges};
use crate::constants::PIECE_HASH_LEN;
use crate::storage::{FileList, PieceFileSpan, StorageError};

/// SHA-1 digest of one piece.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceHash(pub [u8; PIECE_HASH_LEN]);

impl PieceHash {
    pub fn as_bytes(&self) -> &[u8; PIECE_HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hashes `data` in one call. Used to check streamed digests.
    pub fn of(data: &[u8]) -> Self {
        PieceHash(Sha1::digest(data).into())
    }
}

impl fmt::Debug for PieceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PieceHash({})", self.to_hex())
    }
}

impl fmt::Display for PieceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Concatenates digests into the `pieces` byte string of an info dictionary.
pub fn concat_hashes(hashes: &[PieceHash]) -> Vec<u8> {
    hashes.iter().flat_map(|h| h.0).collect()
}

struct OpenFile {
    index: usize,
    file: File,
    position: u64,
}

/// Streams file contents piece by piece and yields one digest per piece.
///
/// Data is read through a single reusable buffer and fed to an incremental
/// SHA-1, so memory use does not depend on the piece size. A piece that
/// crosses a file boundary keeps one digest running across both files.
///
/// Each call to [`next_piece`](Self::next_piece) hashes exactly one piece, so
/// callers can check for cancellation between pieces without ever stopping
/// inside one.
pub struct PieceHasher<'a> {
    list: &'a FileList,
    plan: &'a PiecePlan,
    ranges: PieceRanges,
    buffer: Vec<u8>,
    open: Option<OpenFile>,
    bytes_hashed: u64,
}

impl<'a> PieceHasher<'a> {
    pub fn new(list: &'a FileList, plan: &'a PiecePlan, chunk_size: usize) -> Self {
        Self {
            list,
            plan,
            ranges: plan.ranges(),
            buffer: vec![0u8; chunk_size.max(1)],
            open: None,
            bytes_hashed: 0,
        }
    }

    /// Total bytes fed to the digest so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    /// Pieces not yet hashed.
    pub fn remaining(&self) -> usize {
        self.ranges.len()
    }

    /// Hashes the next piece, or returns `None` once every piece is done.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if a file disappeared since enumeration
    /// - [`StorageError::Truncated`] if a file is shorter than recorded
    /// - [`StorageError::File`] for any other read failure
    pub async fn next_piece(&mut self) -> Option<Result<PieceHash, StorageError>> {
        let range = self.ranges.next()?;
        Some(self.hash_range(range).await)
    }

    /// Hashes every remaining piece.
    pub async fn hash_all(mut self) -> Result<Vec<PieceHash>, StorageError> {
        let mut hashes = Vec::with_capacity(self.remaining());
        while let Some(hash) = self.next_piece().await {
            hashes.push(hash?);
        }
        Ok(hashes)
    }

    async fn hash_range(&mut self, range: PieceRange) -> Result<PieceHash, StorageError> {
        let mut hasher = Sha1::new();
        for span in self.plan.spans(&range) {
            self.feed_span(span, &mut hasher).await?;
        }

        let hash = PieceHash(hasher.finalize().into());
        trace!("Piece {} ({} bytes) = {}", range.index, range.length, hash);
        Ok(hash)
    }

    async fn feed_span(
        &mut self,
        span: PieceFileSpan,
        hasher: &mut Sha1,
    ) -> Result<(), StorageError> {
        let path = self
            .list
            .file_path(span.file_index)
            .ok_or_else(|| StorageError::InvalidPath(format!("file #{}", span.file_index)))?;
        let expected = self.list.files[span.file_index].length;

        let mut open = self.take_handle(&span, &path).await?;

        let mut remaining = span.length;
        while remaining > 0 {
            let want = remaining.min(self.buffer.len() as u64) as usize;
            let n = open
                .file
                .read(&mut self.buffer[..want])
                .await
                .map_err(|e| StorageError::at(&path, e))?;

            if n == 0 {
                return Err(StorageError::Truncated {
                    path,
                    expected,
                    actual: open.position,
                });
            }

            hasher.update(&self.buffer[..n]);
            open.position += n as u64;
            self.bytes_hashed += n as u64;
            remaining -= n as u64;
        }

        self.open = Some(open);
        Ok(())
    }

    /// Returns a handle for the span's file positioned at the span start,
    /// reusing the current handle when possible.
    async fn take_handle(
        &mut self,
        span: &PieceFileSpan,
        path: &Path,
    ) -> Result<OpenFile, StorageError> {
        let mut open = match self.open.take() {
            Some(open) if open.index == span.file_index => open,
            _ => {
                trace!("Opening {}", path.display());
                let file = File::open(path)
                    .await
                    .map_err(|e| StorageError::at(path, e))?;
                OpenFile {
                    index: span.file_index,
                    file,
                    position: 0,
                }
            }
        };

        if open.position != span.file_offset {
            open.file
                .seek(SeekFrom::Start(span.file_offset))
                .await
                .map_err(|e| StorageError::at(path, e))?;
            open.position = span.file_offset;
        }

        Ok(open)
    }
}
