use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("io error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("file {} is {actual} bytes, expected {expected}", path.display())]
    Truncated {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("path is not valid utf-8 or has no file name: {0}")]
    InvalidPath(String),

    #[error("not a regular file or directory: {}", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("symlink {} loops back to {}", path.display(), ancestor.display())]
    SymlinkLoop { path: PathBuf, ancestor: PathBuf },
}

impl StorageError {
    /// Attaches the offending path to an I/O error, mapping `NotFound`.
    pub(crate) fn at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path)
        } else {
            StorageError::File { path, source }
        }
    }
}
