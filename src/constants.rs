//! Creation constants and tuning parameters.
//!
//! Piece size defaults follow what qBittorrent, Transmission and libtorrent
//! offer in their torrent creators.

// ============================================================================
// Client identification
// ============================================================================

/// Written to the `created by` field unless the caller overrides it.
pub const CREATED_BY: &str = concat!("rbit-create/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Pieces
// ============================================================================

/// Default piece size (256 KiB).
pub const DEFAULT_PIECE_SIZE: u64 = 256 * 1024;

/// Smallest piece size offered by common clients (16 KiB).
pub const MIN_RECOMMENDED_PIECE_SIZE: u64 = 16 * 1024;

/// Largest piece size offered by common clients (64 MiB).
pub const MAX_RECOMMENDED_PIECE_SIZE: u64 = 64 * 1024 * 1024;

/// Size of a SHA-1 piece digest.
pub const PIECE_HASH_LEN: usize = 20;

// ============================================================================
// Disk I/O
// ============================================================================

/// Bytes read per `read` call while hashing. Peak hashing memory is one
/// buffer of this size regardless of piece size.
pub const READ_CHUNK_SIZE: usize = 16 * 1024;

// ============================================================================
// Enumeration
// ============================================================================

/// Files and directories whose name starts with this character are skipped.
pub const HIDDEN_FILE_PREFIX: char = '.';

// ============================================================================
// Progress
// ============================================================================

/// Percentage reached once every piece is hashed. The remainder covers
/// building and writing the torrent; 100 is reported only on success.
pub const HASHING_PROGRESS_SPAN: u8 = 99;
