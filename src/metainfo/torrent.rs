use std::collections::BTreeMap;
use std::path::PathBuf;

use bytes::Bytes;

use super::error::MetainfoError;
use super::info_hash::InfoHash;
use crate::bencode::{decode, encode, Value};
use crate::constants::PIECE_HASH_LEN;
use crate::piece::PieceHash;

type Dict = BTreeMap<Bytes, Value>;

/// A parsed v1 torrent file.
///
/// Used to read back and check torrents produced by
/// [`TorrentCreator`](crate::creator::TorrentCreator).
///
/// # Examples
///
/// ```no_run
/// use rbit_create::metainfo::Metainfo;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("album.torrent")?;
/// let metainfo = Metainfo::from_bytes(&data)?;
///
/// println!("{} ({} bytes)", metainfo.info.name, metainfo.info.total_length);
/// for tracker in metainfo.trackers() {
///     println!("  {tracker}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Metainfo {
    pub info: Info,
    /// SHA-1 of the bencoded info dictionary.
    pub info_hash: InfoHash,
    pub announce: Option<String>,
    /// Tracker tiers ([BEP-12](http://bittorrent.org/beps/bep_0012.html)).
    pub announce_list: Vec<Vec<String>>,
    /// Web seeds ([BEP-19](http://bittorrent.org/beps/bep_0019.html)),
    /// whether stored as one string or a list.
    pub url_list: Vec<String>,
    pub creation_date: Option<i64>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    raw_info: Bytes,
}

/// The info dictionary of a v1 torrent.
#[derive(Debug, Clone)]
pub struct Info {
    pub name: String,
    pub piece_length: u64,
    pub pieces: Vec<PieceHash>,
    /// Files in stream order. A single-file torrent has one entry named
    /// after the torrent.
    pub files: Vec<File>,
    pub total_length: u64,
    pub private: bool,
    pub source: Option<String>,
}

/// A file within a torrent. The path starts with the torrent name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: PathBuf,
    pub length: u64,
    /// Byte offset within the concatenated content.
    pub offset: u64,
}

impl Metainfo {
    /// Parses a torrent file.
    ///
    /// # Errors
    ///
    /// - [`MetainfoError::Bencode`] if the data is not canonical bencode
    /// - [`MetainfoError::MissingField`] if a required key is absent
    /// - [`MetainfoError::InvalidField`] if a key has the wrong type or value
    /// - [`MetainfoError::PieceCountMismatch`] if the hashes do not cover the
    ///   content exactly
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let root = decode(data)?;
        let root = root.as_dict().ok_or(MetainfoError::InvalidField("root"))?;

        let info_value = root
            .get(b"info".as_slice())
            .ok_or(MetainfoError::MissingField("info"))?;

        // Strict decoding guarantees re-encoding reproduces the input bytes.
        let raw_info = Bytes::from(encode(info_value)?);

        Ok(Self {
            info: Info::from_value(info_value)?,
            info_hash: InfoHash::from_info_bytes(&raw_info),
            announce: text(root, b"announce"),
            announce_list: root
                .get(b"announce-list".as_slice())
                .and_then(Value::as_list)
                .map(|tiers| {
                    tiers
                        .iter()
                        .filter_map(Value::as_list)
                        .map(|urls| texts(urls))
                        .collect()
                })
                .unwrap_or_default(),
            url_list: match root.get(b"url-list".as_slice()) {
                Some(Value::List(urls)) => texts(urls),
                Some(other) => other.as_str().map(str::to_owned).into_iter().collect(),
                None => Vec::new(),
            },
            creation_date: root.get(b"creation date".as_slice()).and_then(Value::as_integer),
            comment: text(root, b"comment"),
            created_by: text(root, b"created by"),
            raw_info,
        })
    }

    /// The bencoded info dictionary exactly as hashed.
    pub fn raw_info(&self) -> &Bytes {
        &self.raw_info
    }

    /// Every tracker URL, `announce` first, without duplicates.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers: Vec<String> = self.announce.iter().cloned().collect();
        for url in self.announce_list.iter().flatten() {
            if !trackers.contains(url) {
                trackers.push(url.clone());
            }
        }
        trackers
    }
}

impl Info {
    fn from_value(value: &Value) -> Result<Self, MetainfoError> {
        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("info"))?;

        let name = text(dict, b"name").ok_or(MetainfoError::MissingField("name"))?;

        let piece_length = length(dict, b"piece length", "piece length")?
            .ok_or(MetainfoError::MissingField("piece length"))?;
        if piece_length == 0 {
            return Err(MetainfoError::InvalidField("piece length"));
        }

        let raw_pieces = dict
            .get(b"pieces".as_slice())
            .and_then(Value::as_bytes)
            .ok_or(MetainfoError::MissingField("pieces"))?;
        if raw_pieces.len() % PIECE_HASH_LEN != 0 {
            return Err(MetainfoError::InvalidField("pieces"));
        }
        let pieces = raw_pieces
            .chunks_exact(PIECE_HASH_LEN)
            .map(|chunk| {
                let mut digest = [0u8; PIECE_HASH_LEN];
                digest.copy_from_slice(chunk);
                PieceHash(digest)
            })
            .collect::<Vec<_>>();

        let files = match (
            length(dict, b"length", "length")?,
            dict.get(b"files".as_slice()).and_then(Value::as_list),
        ) {
            (Some(length), _) => vec![File {
                path: PathBuf::from(&name),
                length,
                offset: 0,
            }],
            (None, Some(entries)) => files_from(&name, entries)?,
            (None, None) => return Err(MetainfoError::MissingField("length or files")),
        };
        let total_length: u64 = files.iter().map(|f| f.length).sum();

        let expected = total_length.div_ceil(piece_length);
        if pieces.len() as u64 != expected {
            return Err(MetainfoError::PieceCountMismatch {
                expected,
                actual: pieces.len() as u64,
            });
        }

        Ok(Self {
            private: dict.get(b"private".as_slice()).and_then(Value::as_integer) == Some(1),
            source: text(dict, b"source"),
            name,
            piece_length,
            pieces,
            files,
            total_length,
        })
    }
}

fn files_from(name: &str, entries: &[Value]) -> Result<Vec<File>, MetainfoError> {
    let mut offset = 0u64;
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_dict().ok_or(MetainfoError::InvalidField("files"))?;
            let length = length(entry, b"length", "file length")?
                .ok_or(MetainfoError::MissingField("file length"))?;
            let components = entry
                .get(b"path".as_slice())
                .and_then(Value::as_list)
                .ok_or(MetainfoError::MissingField("file path"))?;

            let file = File {
                path: std::iter::once(name.to_owned())
                    .chain(texts(components))
                    .collect(),
                length,
                offset,
            };
            offset += length;
            Ok(file)
        })
        .collect()
}

fn text(dict: &Dict, key: &[u8]) -> Option<String> {
    dict.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn texts(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

/// Reads a non-negative integer. A negative value is an error; a missing
/// key is `None`.
fn length(dict: &Dict, key: &[u8], field: &'static str) -> Result<Option<u64>, MetainfoError> {
    dict.get(key)
        .and_then(Value::as_integer)
        .map(|n| u64::try_from(n).map_err(|_| MetainfoError::InvalidField(field)))
        .transpose()
}
