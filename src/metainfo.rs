//! Torrent metainfo assembly and reading ([BEP-3], [BEP-12], [BEP-19]).
//!
//! [`DescriptorBuilder`] turns a file layout and its piece hashes into a
//! [`TorrentDescriptor`], which encodes to the canonical `.torrent` bytes.
//! [`Metainfo`] parses those bytes back, which is how created torrents are
//! checked.
//!
//! # Examples
//!
//! ```
//! use rbit_create::metainfo::{DescriptorBuilder, Metainfo};
//! use rbit_create::piece::PieceHash;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = DescriptorBuilder::new("album", 4)
//!     .add_file(["cover.jpg"], 3)
//!     .add_file(["disc1", "track1.flac"], 5)
//!     .pieces(vec![PieceHash::of(b"abcd"), PieceHash::of(b"efgh")])
//!     .add_tracker("http://tracker.example.com/announce", 0)
//!     .private(true)
//!     .build()?;
//!
//! let torrent = Metainfo::from_bytes(&descriptor.encode()?)?;
//! assert_eq!(torrent.info.name, "album");
//! assert_eq!(torrent.info.total_length, 8);
//! assert!(torrent.info.private);
//! assert_eq!(torrent.info_hash, descriptor.info_hash()?);
//! # Ok(())
//! # }
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-12]: http://bittorrent.org/beps/bep_0012.html
//! [BEP-19]: http://bittorrent.org/beps/bep_0019.html

mod builder;
mod error;
mod info_hash;
mod torrent;

pub use builder::{ContentLayout, DescriptorBuilder, DescriptorFile, TorrentDescriptor};
pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use torrent::{File, Info, Metainfo};
