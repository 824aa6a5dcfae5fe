//! rbit-create - BitTorrent v1 torrent creation
//!
//! This library turns a file or directory into a `.torrent` file following
//! the BEP (BitTorrent Enhancement Proposals) specifications. Output is
//! canonical bencode, so the same input always produces the same bytes.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding
//! - [`storage`] - Input enumeration and the file layout
//! - [`piece`] - Piece planning and streaming SHA-1 hashing
//! - [`metainfo`] - BEP-3/12/19 descriptor assembly and reading
//! - [`creator`] - Cancellable creation runs with progress reporting
//! - [`constants`] - Defaults and tuning parameters

pub mod bencode;
pub mod constants;
pub mod creator;
pub mod metainfo;
pub mod piece;
pub mod storage;

pub use bencode::{decode, encode, BencodeError, Value};
pub use creator::{
    estimate_piece_count, CancellationToken, CreateError, CreatedTorrent, CreationHandle,
    CreationRequest, CreationState, CreationStatus, CreatorConfig, CreatorEvent, ErrorKind,
    TorrentCreator,
};
pub use metainfo::{DescriptorBuilder, InfoHash, Metainfo, MetainfoError, TorrentDescriptor};
pub use piece::{PieceHash, PieceHasher, PiecePlan, PlanError};
pub use storage::{enumerate, FileEntry, FileList, StorageError};
