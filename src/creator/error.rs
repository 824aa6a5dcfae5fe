use std::path::PathBuf;

use thiserror::Error;

use crate::metainfo::MetainfoError;
use crate::piece::PlanError;
use crate::storage::StorageError;

/// Errors that end a torrent creation run.
///
/// Cancellation is not an error; it is reported as
/// [`CreationStatus::Cancelled`](super::CreationStatus::Cancelled).
#[derive(Debug, Error)]
pub enum CreateError {
    /// Reading the input or writing the torrent file failed.
    #[error(transparent)]
    Io(#[from] StorageError),

    /// The input contains no bytes, so there is nothing to hash.
    #[error("no data to hash under {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The descriptor could not be assembled or serialized.
    #[error("failed to encode torrent: {0}")]
    Encoding(#[from] MetainfoError),

    /// A run on this creator is still in progress.
    #[error("torrent creation already in progress")]
    AlreadyRunning,

    /// The worker task panicked or was aborted.
    #[error("creation task failed: {0}")]
    TaskFailed(String),
}

/// Broad category of a [`CreateError`], carried by failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    EmptyInput,
    InvalidConfig,
    Internal,
}

impl CreateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CreateError::Io(_) => ErrorKind::Io,
            CreateError::EmptyInput(_) => ErrorKind::EmptyInput,
            CreateError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            CreateError::Encoding(_) | CreateError::AlreadyRunning | CreateError::TaskFailed(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<std::io::Error> for CreateError {
    fn from(err: std::io::Error) -> Self {
        CreateError::Io(StorageError::Io(err))
    }
}

impl From<PlanError> for CreateError {
    fn from(err: PlanError) -> Self {
        CreateError::InvalidConfig(err.to_string())
    }
}
