//! Piece planning and hashing.
//!
//! A torrent's files are treated as one continuous byte stream that is cut
//! into fixed-size pieces. [`PiecePlan`] computes the piece boundaries and
//! maps each piece back onto file regions; [`PieceHasher`] reads those
//! regions and produces the SHA-1 digest of every piece.
//!
//! # Examples
//!
//! ```no_run
//! use rbit_create::piece::{PieceHasher, PiecePlan};
//! use rbit_create::storage::enumerate;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let list = enumerate(Path::new("./album")).await?;
//! let plan = PiecePlan::new(&list.files, 256 * 1024)?;
//!
//! let mut hasher = PieceHasher::new(&list, &plan, 16 * 1024);
//! while let Some(hash) = hasher.next_piece().await {
//!     println!("{}", hash?);
//! }
//! assert_eq!(hasher.bytes_hashed(), list.total_length());
//! # Ok(())
//! # }
//! ```

mod error;
mod hasher;
mod plan;

pub use error::PlanError;
pub use hasher::{concat_hashes, PieceHash, PieceHasher};
pub use plan::{PiecePlan, PieceRange, PieceRanges};
