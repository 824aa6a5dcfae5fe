//! Assembly of v1 torrent metainfo from already-hashed content.
//!
//! [`DescriptorBuilder`] collects the pieces of a torrent (file list, piece
//! hashes, trackers, web seeds and the optional text fields) and produces a
//! [`TorrentDescriptor`]. Building is a pure transformation with no I/O;
//! hashing the content is the job of [`crate::piece::PieceHasher`].
//!
//! # Examples
//!
//! ```
//! use rbit_create::metainfo::DescriptorBuilder;
//! use rbit_create::piece::PieceHash;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = DescriptorBuilder::new("hello.txt", 16384)
//!     .single_file(5)
//!     .pieces(vec![PieceHash::of(b"hello")])
//!     .trackers(["http://a.example/announce", "", "http://b.example/announce"])
//!     .comment("greetings")
//!     .build()?;
//!
//! assert_eq!(descriptor.announce(), Some("http://a.example/announce"));
//! assert_eq!(descriptor.tiers().len(), 2);
//!
//! let bytes = descriptor.encode()?;
//! assert!(bytes.starts_with(b"d8:announce"));
//! # Ok(())
//! # }
//! ```
//!
//! # Key presence
//!
//! Several keys are omitted rather than written empty, because readers treat
//! an absent key and an empty value differently:
//!
//! | Key | Written when |
//! |-----|--------------|
//! | `announce` | at least one tracker |
//! | `announce-list` | more than one tracker |
//! | `url-list` | at least one web seed (string for one, list for several) |
//! | `comment`, `created by` | non-empty |
//! | `creation date` | explicitly set |
//! | info `private` | private torrent (`1`); absent otherwise |
//! | info `source` | non-empty |

use std::collections::BTreeMap;

use bytes::Bytes;

use super::error::MetainfoError;
use super::info_hash::InfoHash;
use crate::bencode::{encode, encode_to, Value};
use crate::piece::{concat_hashes, PieceHash};

/// Content layout of a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLayout {
    /// One file named after the torrent.
    Single { length: u64 },
    /// Files below a directory named after the torrent, in stream order.
    Multi(Vec<DescriptorFile>),
}

/// A file entry of a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFile {
    /// Path components below the torrent directory.
    pub path: Vec<String>,
    pub length: u64,
}

impl ContentLayout {
    pub fn total_length(&self) -> u64 {
        match self {
            ContentLayout::Single { length } => *length,
            ContentLayout::Multi(files) => files.iter().map(|f| f.length).sum(),
        }
    }
}

/// Fully assembled torrent metadata, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentDescriptor {
    name: String,
    piece_length: u64,
    pieces: Vec<PieceHash>,
    layout: ContentLayout,
    private: bool,
    source: Option<String>,
    tiers: Vec<Vec<String>>,
    url_seeds: Vec<String>,
    comment: Option<String>,
    created_by: Option<String>,
    creation_date: Option<i64>,
}

impl TorrentDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    pub fn pieces(&self) -> &[PieceHash] {
        &self.pieces
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn total_length(&self) -> u64 {
        self.layout.total_length()
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Tracker tiers in priority order.
    pub fn tiers(&self) -> &[Vec<String>] {
        &self.tiers
    }

    /// The primary tracker: the first tracker of the first tier.
    pub fn announce(&self) -> Option<&str> {
        self.tiers.first()?.first().map(String::as_str)
    }

    pub fn url_seeds(&self) -> &[String] {
        &self.url_seeds
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn creation_date(&self) -> Option<i64> {
        self.creation_date
    }

    /// Builds the info dictionary.
    pub fn info_value(&self) -> Value {
        let mut info = BTreeMap::new();

        info.insert(
            Bytes::from_static(b"name"),
            Value::string(&self.name),
        );
        info.insert(
            Bytes::from_static(b"piece length"),
            Value::from(self.piece_length),
        );
        info.insert(
            Bytes::from_static(b"pieces"),
            Value::from(concat_hashes(&self.pieces)),
        );

        match &self.layout {
            ContentLayout::Single { length } => {
                info.insert(Bytes::from_static(b"length"), Value::from(*length));
            }
            ContentLayout::Multi(files) => {
                let list = files
                    .iter()
                    .map(|file| {
                        Value::dict([
                            ("length", Value::from(file.length)),
                            ("path", Value::list(&file.path)),
                        ])
                    })
                    .collect();
                info.insert(Bytes::from_static(b"files"), Value::List(list));
            }
        }

        if self.private {
            info.insert(Bytes::from_static(b"private"), Value::Integer(1));
        }

        if let Some(ref source) = self.source {
            info.insert(Bytes::from_static(b"source"), Value::string(source));
        }

        Value::Dict(info)
    }

    /// Builds the complete top-level dictionary.
    pub fn to_value(&self) -> Value {
        let mut root = BTreeMap::new();
        root.insert(Bytes::from_static(b"info"), self.info_value());

        if let Some(announce) = self.announce() {
            root.insert(Bytes::from_static(b"announce"), Value::string(announce));
        }

        if self.tiers.iter().map(Vec::len).sum::<usize>() > 1 {
            let list = self.tiers.iter().map(Value::list).collect();
            root.insert(Bytes::from_static(b"announce-list"), Value::List(list));
        }

        match self.url_seeds.as_slice() {
            [] => {}
            [single] => {
                root.insert(Bytes::from_static(b"url-list"), Value::string(single));
            }
            seeds => {
                root.insert(Bytes::from_static(b"url-list"), Value::list(seeds));
            }
        }

        if let Some(ref comment) = self.comment {
            root.insert(Bytes::from_static(b"comment"), Value::string(comment));
        }

        if let Some(ref created_by) = self.created_by {
            root.insert(Bytes::from_static(b"created by"), Value::string(created_by));
        }

        if let Some(timestamp) = self.creation_date {
            root.insert(Bytes::from_static(b"creation date"), Value::Integer(timestamp));
        }

        Value::Dict(root)
    }

    /// Encodes the torrent file.
    pub fn encode(&self) -> Result<Vec<u8>, MetainfoError> {
        Ok(encode(&self.to_value())?)
    }

    /// Writes the encoded torrent file to `writer`.
    pub fn encode_to<W: std::io::Write>(&self, writer: &mut W) -> Result<(), MetainfoError> {
        Ok(encode_to(&self.to_value(), writer)?)
    }

    /// SHA-1 of the encoded info dictionary.
    pub fn info_hash(&self) -> Result<InfoHash, MetainfoError> {
        let raw_info = encode(&self.info_value())?;
        Ok(InfoHash::from_info_bytes(&raw_info))
    }
}

/// Builder for [`TorrentDescriptor`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    piece_length: u64,
    pieces: Vec<PieceHash>,
    layout: Option<ContentLayout>,
    private: bool,
    source: Option<String>,
    trackers: Vec<(String, u32)>,
    url_seeds: Vec<String>,
    comment: Option<String>,
    created_by: Option<String>,
    creation_date: Option<i64>,
}

impl DescriptorBuilder {
    /// Creates a builder for a torrent named `name` with pieces of
    /// `piece_length` bytes.
    pub fn new(name: impl Into<String>, piece_length: u64) -> Self {
        Self {
            name: name.into(),
            piece_length,
            pieces: Vec::new(),
            layout: None,
            private: false,
            source: None,
            trackers: Vec::new(),
            url_seeds: Vec::new(),
            comment: None,
            created_by: None,
            creation_date: None,
        }
    }

    /// Describes a single-file torrent of `length` bytes.
    pub fn single_file(mut self, length: u64) -> Self {
        self.layout = Some(ContentLayout::Single { length });
        self
    }

    /// Appends a file to a multi-file torrent. Files must be added in
    /// stream order.
    pub fn add_file<I, S>(mut self, path: I, length: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let file = DescriptorFile {
            path: path.into_iter().map(Into::into).collect(),
            length,
        };
        match self.layout {
            Some(ContentLayout::Multi(ref mut files)) => files.push(file),
            _ => self.layout = Some(ContentLayout::Multi(vec![file])),
        }
        self
    }

    /// Sets the piece hashes, in piece order.
    pub fn pieces(mut self, pieces: Vec<PieceHash>) -> Self {
        self.pieces = pieces;
        self
    }

    /// Adds a tracker to the given tier.
    pub fn add_tracker(mut self, url: impl Into<String>, tier: u32) -> Self {
        self.trackers.push((url.into(), tier));
        self
    }

    /// Adds trackers from a list where an empty entry starts a new tier.
    ///
    /// `["a", "b", "", "c"]` yields tiers `[[a, b], [c]]`. URLs are trimmed.
    /// Only a truly empty entry separates tiers; a whitespace-only entry is
    /// dropped.
    pub fn trackers<I, S>(mut self, trackers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tier = self.trackers.last().map_or(0, |(_, t)| *t);
        for tracker in trackers {
            let tracker = tracker.as_ref();
            if tracker.is_empty() {
                tier += 1;
                continue;
            }
            let url = tracker.trim();
            if !url.is_empty() {
                self.trackers.push((url.to_string(), tier));
            }
        }
        self
    }

    /// Adds a web seed (BEP-19). Blank URLs are ignored.
    pub fn add_url_seed(mut self, url: impl AsRef<str>) -> Self {
        let url = url.as_ref().trim();
        if !url.is_empty() {
            self.url_seeds.push(url.to_string());
        }
        self
    }

    /// Sets whether this is a private torrent.
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Sets the `source` tag. An empty string leaves the key out.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = non_empty(source.into());
        self
    }

    /// Sets the comment. An empty string leaves the key out.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = non_empty(comment.into());
        self
    }

    /// Sets the creator string. An empty string leaves the key out.
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = non_empty(created_by.into());
        self
    }

    /// Sets the creation date (Unix timestamp).
    pub fn creation_date(mut self, timestamp: i64) -> Self {
        self.creation_date = Some(timestamp);
        self
    }

    /// Validates the collected fields and produces the descriptor.
    ///
    /// # Errors
    ///
    /// - [`MetainfoError::MissingField`] if the name or content is missing
    /// - [`MetainfoError::InvalidField`] for a zero piece length or a bad
    ///   path component
    /// - [`MetainfoError::PieceCountMismatch`] if the hashes do not cover
    ///   the content exactly
    pub fn build(self) -> Result<TorrentDescriptor, MetainfoError> {
        if self.name.is_empty() {
            return Err(MetainfoError::MissingField("name"));
        }
        if self.piece_length == 0 {
            return Err(MetainfoError::InvalidField("piece length"));
        }

        let layout = self.layout.ok_or(MetainfoError::MissingField("files"))?;
        if let ContentLayout::Multi(ref files) = layout {
            for file in files {
                if file.path.is_empty() {
                    return Err(MetainfoError::InvalidField("empty file path"));
                }
                if file
                    .path
                    .iter()
                    .any(|c| c.is_empty() || c == "." || c == ".." || c.contains('/'))
                {
                    return Err(MetainfoError::InvalidField("invalid path component"));
                }
            }
        }

        let expected = layout.total_length().div_ceil(self.piece_length);
        let actual = self.pieces.len() as u64;
        if expected != actual {
            return Err(MetainfoError::PieceCountMismatch { expected, actual });
        }

        Ok(TorrentDescriptor {
            name: self.name,
            piece_length: self.piece_length,
            pieces: self.pieces,
            layout,
            private: self.private,
            source: self.source,
            tiers: group_tiers(self.trackers),
            url_seeds: self.url_seeds,
            comment: self.comment,
            created_by: self.created_by,
            creation_date: self.creation_date,
        })
    }
}

/// Groups `(url, tier)` pairs into tiers, lowest tier first. Trackers keep
/// their insertion order within a tier.
fn group_tiers(mut trackers: Vec<(String, u32)>) -> Vec<Vec<String>> {
    trackers.sort_by_key(|(_, tier)| *tier);

    let mut tiers: Vec<Vec<String>> = Vec::new();
    let mut current_tier = None;
    for (url, tier) in trackers {
        match tiers.last_mut() {
            Some(last) if current_tier == Some(tier) => last.push(url),
            _ => tiers.push(vec![url]),
        }
        current_tier = Some(tier);
    }
    tiers
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
