use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use super::error::StorageError;
use super::file::{FileEntry, FileList};
use crate::constants::HIDDEN_FILE_PREFIX;

/// Enumerates the files under `path` in a stable, reproducible order.
///
/// A regular file yields a single entry. A directory is walked depth-first
/// with siblings sorted by name, which orders files by their path
/// components. Any file or directory whose name starts with `.` is skipped
/// as it is encountered, so hidden subtrees are never read; a hidden root
/// yields an empty list. Symlinks are followed, and anything that is neither
/// a regular file nor a directory is ignored.
///
/// The walk runs on tokio's blocking pool.
///
/// # Errors
///
/// - [`StorageError::NotFound`] if `path` or a symlink target does not exist
/// - [`StorageError::File`] if a directory or file cannot be inspected
/// - [`StorageError::SymlinkLoop`] if a symlink points back at an ancestor
/// - [`StorageError::InvalidPath`] if a name is not valid UTF-8
pub async fn enumerate(path: &Path) -> Result<FileList, StorageError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || walk(&path))
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
}

fn walk(path: &Path) -> Result<FileList, StorageError> {
    let path = resolve(path)?;
    let metadata = std::fs::metadata(&path).map_err(|e| StorageError::at(&path, e))?;

    let name = utf8_name(path.file_name(), &path)?;
    let base_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let single_file = metadata.is_file();

    if !single_file && !metadata.is_dir() {
        return Err(StorageError::UnsupportedFileType(path));
    }

    if is_hidden(OsStr::new(&name)) {
        debug!("Input {} is hidden, nothing to enumerate", path.display());
        return Ok(FileList {
            name,
            base_path,
            single_file,
            files: Vec::new(),
        });
    }

    if single_file {
        return Ok(FileList {
            files: vec![FileEntry::new(PathBuf::from(&name), metadata.len(), 0)],
            name,
            base_path,
            single_file,
        });
    }

    let walker = WalkDir::new(&path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !skip_hidden(entry));

    let mut files = Vec::new();
    let mut offset = 0u64;
    for entry in walker {
        let entry = entry.map_err(walk_error)?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            trace!("Skipping special file {}", entry.path().display());
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(&path)
            .map_err(|_| StorageError::InvalidPath(entry.path().display().to_string()))?;
        let mut torrent_path = PathBuf::from(&name);
        for component in relative.components() {
            if let Component::Normal(part) = component {
                torrent_path.push(utf8_name(Some(part), entry.path())?);
            }
        }

        let length = entry.metadata().map_err(walk_error)?.len();
        files.push(FileEntry::new(torrent_path, length, offset));
        offset += length;
    }

    debug!(
        "Enumerated {} files ({} bytes) under {}",
        files.len(),
        offset,
        path.display()
    );

    Ok(FileList {
        name,
        base_path,
        single_file: false,
        files,
    })
}

/// Makes `path` absolute so the base directory is never empty. `.` and `..`
/// have no name of their own and are resolved through the filesystem.
fn resolve(path: &Path) -> Result<PathBuf, StorageError> {
    let absolute = std::path::absolute(path).map_err(|e| StorageError::at(path, e))?;
    if absolute.file_name().is_some() {
        return Ok(absolute);
    }
    std::fs::canonicalize(&absolute).map_err(|e| StorageError::at(&absolute, e))
}

fn skip_hidden(entry: &DirEntry) -> bool {
    let hidden = is_hidden(entry.file_name());
    if hidden {
        trace!("Skipping hidden entry {}", entry.path().display());
    }
    hidden
}

fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes()
        .first()
        .is_some_and(|&b| b == HIDDEN_FILE_PREFIX as u8)
}

fn utf8_name(name: Option<&OsStr>, path: &Path) -> Result<String, StorageError> {
    name.and_then(OsStr::to_str)
        .map(String::from)
        .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))
}

fn walk_error(err: walkdir::Error) -> StorageError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    if let Some(ancestor) = err.loop_ancestor() {
        return StorageError::SymlinkLoop {
            path,
            ancestor: ancestor.to_path_buf(),
        };
    }
    StorageError::at(path, err.into())
}
