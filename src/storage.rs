//! Input enumeration and the on-disk file model.
//!
//! A torrent's content is the virtual concatenation of its files in a fixed
//! order. This module walks the input path, decides that order, and records
//! where each file starts in the concatenated stream.
//!
//! # Components
//!
//! - [`enumerate`] - Walks a file or directory into a [`FileList`]
//! - [`FileEntry`] - A file's relative path, length and stream offset
//! - [`PieceFileSpan`] - The part of a piece that lies inside one file
//!
//! # Examples
//!
//! ```no_run
//! use rbit_create::storage::enumerate;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let list = enumerate(Path::new("./album")).await?;
//!
//! println!("{} files, {} bytes", list.len(), list.total_length());
//! for file in &list.files {
//!     println!("  {} @ {}", file.path.display(), file.offset);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Ordering
//!
//! Entries are sorted by path components, and hidden entries (names starting
//! with `.`) are excluded while walking. The same tree therefore always
//! yields the same list, which is what makes torrent creation reproducible.

mod enumerate;
mod error;
mod file;

pub use enumerate::enumerate;
pub use error::StorageError;
pub use file::{total_length, FileEntry, FileList, PieceFileSpan};
