use std::path::PathBuf;

use tracing::warn;

use super::error::CreateError;
use crate::constants::{DEFAULT_PIECE_SIZE, MAX_RECOMMENDED_PIECE_SIZE, MIN_RECOMMENDED_PIECE_SIZE};

/// Parameters of one torrent creation run.
///
/// # Examples
///
/// ```
/// use rbit_create::creator::CreationRequest;
///
/// let request = CreationRequest::new("./album", "./album.torrent")
///     .piece_size(1 << 20)
///     .trackers(["udp://tracker.example.com:1337", "", "http://backup.example.com/announce"])
///     .url_seed("https://mirror.example.com/album/")
///     .comment("Live at the Roxy")
///     .private(true);
///
/// assert_eq!(request.piece_size, 1 << 20);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    /// File or directory to hash.
    pub input_path: PathBuf,
    /// Where the torrent file is written. The parent directory must exist.
    pub output_path: PathBuf,
    pub piece_size: u64,
    /// Tracker URLs in priority order; an empty entry separates tiers.
    pub trackers: Vec<String>,
    /// Web seed URLs. Blank entries are ignored.
    pub url_seeds: Vec<String>,
    pub comment: String,
    /// Source tag stored in the info dictionary.
    pub source: String,
    pub private: bool,
    pub creation_date: Option<i64>,
    /// Overrides [`CreatorConfig::created_by`](super::CreatorConfig::created_by).
    pub created_by: Option<String>,
}

impl CreationRequest {
    /// Creates a request to hash `input` (a file or directory) into a torrent
    /// written at `output`, with the default piece size.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input.into(),
            output_path: output.into(),
            piece_size: DEFAULT_PIECE_SIZE,
            trackers: Vec::new(),
            url_seeds: Vec::new(),
            comment: String::new(),
            source: String::new(),
            private: false,
            creation_date: None,
            created_by: None,
        }
    }

    pub fn piece_size(mut self, piece_size: u64) -> Self {
        self.piece_size = piece_size;
        self
    }

    /// Appends trackers. An empty entry starts a new tier.
    pub fn trackers<I, S>(mut self, trackers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trackers.extend(trackers.into_iter().map(Into::into));
        self
    }

    pub fn url_seed(mut self, url: impl Into<String>) -> Self {
        self.url_seeds.push(url.into());
        self
    }

    pub fn url_seeds<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_seeds.extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Records a creation date (Unix timestamp). Without one the key is
    /// omitted and repeated runs produce identical files.
    pub fn creation_date(mut self, timestamp: i64) -> Self {
        self.creation_date = Some(timestamp);
        self
    }

    /// Overrides the creator's `created by` string for this run.
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Checks the request before any I/O is done.
    ///
    /// A piece size that is not a power of two, or lies outside the range
    /// common clients offer, is accepted with a warning.
    ///
    /// # Errors
    ///
    /// [`CreateError::InvalidConfig`] for a zero piece size or an empty
    /// input or output path.
    pub fn validate(&self) -> Result<(), CreateError> {
        if self.piece_size == 0 {
            return Err(CreateError::InvalidConfig(
                "piece size must be greater than zero".into(),
            ));
        }
        if self.input_path.as_os_str().is_empty() {
            return Err(CreateError::InvalidConfig("input path is empty".into()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(CreateError::InvalidConfig("output path is empty".into()));
        }

        if !self.piece_size.is_power_of_two() {
            warn!("Piece size {} is not a power of two", self.piece_size);
        }
        if !(MIN_RECOMMENDED_PIECE_SIZE..=MAX_RECOMMENDED_PIECE_SIZE).contains(&self.piece_size) {
            warn!(
                "Piece size {} is outside the usual range {}..={}",
                self.piece_size, MIN_RECOMMENDED_PIECE_SIZE, MAX_RECOMMENDED_PIECE_SIZE
            );
        }

        Ok(())
    }
}
