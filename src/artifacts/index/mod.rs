//! Index file format
//!
//! The index (staging area) records which blob every tracked path will have in
//! the next commit.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "KIDX" (4 bytes)
//!   - Version: 1 (4 bytes, big-endian)
//!   - Entry count (4 bytes, big-endian)
//!
//! Entries (variable length, sorted by path):
//!   - Blob id (20 raw bytes)
//!   - Path length (2 bytes, big-endian)
//!   - Path (UTF-8 bytes)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"KIDX";

/// Index file format version
pub const VERSION: u32 = 1;
