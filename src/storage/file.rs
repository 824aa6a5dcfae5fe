use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A file that contributes bytes to the torrent.
///
/// `path` is relative to the base directory of the enumeration and always
/// starts with the torrent name: `movie.mkv` for a single-file torrent,
/// `album/cd1/01.flac` for a directory. `offset` is where the file starts in
/// the virtual concatenation of all files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub length: u64,
    pub offset: u64,
}

impl FileEntry {
    pub fn new(path: PathBuf, length: u64, offset: u64) -> Self {
        Self {
            path,
            length,
            offset,
        }
    }

    pub fn byte_range(&self) -> Range<u64> {
        self.offset..self.offset + self.length
    }

    pub fn contains_offset(&self, offset: u64) -> bool {
        self.byte_range().contains(&offset)
    }

    /// Path components below the torrent name, as written to the `files`
    /// list of a multi-file torrent.
    pub fn torrent_path(&self) -> Vec<Cow<'_, str>> {
        self.path
            .components()
            .skip(1)
            .map(|c| c.as_os_str().to_string_lossy())
            .collect()
    }
}

/// The portion of a piece that lies inside one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceFileSpan {
    pub file_index: usize,
    pub file_offset: u64,
    pub length: u64,
}

/// Result of enumerating an input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileList {
    /// Name of the input file or directory; becomes the torrent `name`.
    pub name: String,
    /// Directory that file paths are relative to (the parent of the input).
    pub base_path: PathBuf,
    /// True when the input was a single regular file.
    pub single_file: bool,
    /// Files in enumeration order with cumulative offsets assigned.
    pub files: Vec<FileEntry>,
}

impl FileList {
    pub fn total_length(&self) -> u64 {
        total_length(&self.files)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// On-disk location of the file at `index`.
    pub fn file_path(&self, index: usize) -> Option<PathBuf> {
        self.files.get(index).map(|f| self.base_path.join(&f.path))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

pub fn total_length(files: &[FileEntry]) -> u64 {
    files.iter().map(|f| f.length).sum()
}
