use std::ops::Range;

use super::error::PlanError;
use crate::storage::{FileEntry, PieceFileSpan};

/// A piece's position in the virtual concatenation of all files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceRange {
    pub index: u32,
    pub offset: u64,
    pub length: u64,
}

impl PieceRange {
    pub fn byte_range(&self) -> Range<u64> {
        self.offset..self.offset + self.length
    }
}

/// Splits the concatenated file stream into fixed-size pieces.
///
/// Every piece is `piece_size` bytes except possibly the last. The plan keeps
/// only file offsets and lengths, so it is cheap to build for trees with
/// hundreds of thousands of files.
#[derive(Debug, Clone)]
pub struct PiecePlan {
    piece_size: u64,
    total_length: u64,
    piece_count: u32,
    files: Vec<Range<u64>>,
}

impl PiecePlan {
    /// Plans pieces over `files`, which must carry cumulative offsets in
    /// enumeration order.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidPieceSize`] if `piece_size` is zero
    /// - [`PlanError::TooManyPieces`] if the piece count does not fit in `u32`
    pub fn new(files: &[FileEntry], piece_size: u64) -> Result<Self, PlanError> {
        if piece_size == 0 {
            return Err(PlanError::InvalidPieceSize(piece_size));
        }

        let files: Vec<Range<u64>> = files.iter().map(FileEntry::byte_range).collect();
        let total_length = files.last().map_or(0, |f| f.end);
        let count = total_length.div_ceil(piece_size);
        let piece_count = u32::try_from(count).map_err(|_| PlanError::TooManyPieces(count))?;

        Ok(Self {
            piece_size,
            total_length,
            piece_count,
            files,
        })
    }

    pub fn piece_size(&self) -> u64 {
        self.piece_size
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Number of pieces; zero only when the input holds no bytes.
    pub fn piece_count(&self) -> u32 {
        self.piece_count
    }

    pub fn range(&self, index: u32) -> Option<PieceRange> {
        if index >= self.piece_count {
            return None;
        }
        let offset = u64::from(index) * self.piece_size;
        Some(PieceRange {
            index,
            offset,
            length: self.piece_size.min(self.total_length - offset),
        })
    }

    /// Returns a fresh iterator over every piece range, in index order.
    pub fn ranges(&self) -> PieceRanges {
        PieceRanges {
            piece_size: self.piece_size,
            total_length: self.total_length,
            next: 0,
            end: self.piece_count,
        }
    }

    /// Maps `range` onto the files it covers. Zero-length files never
    /// produce a span.
    pub fn spans(&self, range: &PieceRange) -> Vec<PieceFileSpan> {
        let mut spans = Vec::new();
        let mut current = range.offset;
        let end = range.offset + range.length;

        let first = self.files.partition_point(|f| f.end <= current);
        for (file_index, file) in self.files.iter().enumerate().skip(first) {
            if current >= end {
                break;
            }
            if file.is_empty() {
                continue;
            }

            let take = (file.end - current).min(end - current);
            spans.push(PieceFileSpan {
                file_index,
                file_offset: current - file.start,
                length: take,
            });
            current += take;
        }

        spans
    }
}

/// Lazy iterator over the pieces of a [`PiecePlan`].
#[derive(Debug, Clone)]
pub struct PieceRanges {
    piece_size: u64,
    total_length: u64,
    next: u32,
    end: u32,
}

impl Iterator for PieceRanges {
    type Item = PieceRange;

    fn next(&mut self) -> Option<PieceRange> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let offset = u64::from(index) * self.piece_size;
        Some(PieceRange {
            index,
            offset,
            length: self.piece_size.min(self.total_length - offset),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PieceRanges {}
