//! Torrent creation runs.
//!
//! [`TorrentCreator`] ties the pipeline together: it enumerates the input,
//! hashes every piece, assembles the descriptor and writes the `.torrent`
//! file. A run moves through the [`CreationState`] stages in order and can be
//! stopped at any stage boundary or between two pieces with a
//! [`CancellationToken`]; a cancelled run leaves no output file.
//!
//! Runs can be driven on the caller's task with [`TorrentCreator::run`], or
//! spawned with [`TorrentCreator::create`], which reports through
//! [`CreatorEvent`]s.
//!
//! # Examples
//!
//! ```no_run
//! use rbit_create::creator::{CancellationToken, CreationRequest, CreationStatus, TorrentCreator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let creator = TorrentCreator::new();
//! let request = CreationRequest::new("./album", "./album.torrent")
//!     .piece_size(512 * 1024)
//!     .trackers(["http://a.example/announce", "", "http://b.example/announce"])
//!     .source("EXAMPLE");
//!
//! let cancel = CancellationToken::new();
//! match creator.run(&request, &cancel, |p| println!("{p}%")).await? {
//!     CreationStatus::Created(torrent) => println!("info hash {}", torrent.info_hash),
//!     CreationStatus::Cancelled => println!("cancelled"),
//! }
//! # Ok(())
//! # }
//! ```

mod cancel;
mod config;
mod error;
mod orchestrator;
mod request;

pub use cancel::CancellationToken;
pub use config::CreatorConfig;
pub use error::{CreateError, ErrorKind};
pub use orchestrator::{
    estimate_piece_count, CreatedTorrent, CreationHandle, CreationState, CreationStatus,
    CreatorEvent, TorrentCreator,
};
pub use request::CreationRequest;

#[cfg(test)]
mod tests;
