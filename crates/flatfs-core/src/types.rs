//! Core types shared by the entry table and the request handlers.
//!
//! # Examples
//!
//! ```
//! use flatfs_core::{Attributes, EntryKind};
//!
//! let attr = Attributes::file(5);
//! assert_eq!(attr.kind, EntryKind::RegularFile);
//! assert_eq!(attr.size, 5);
//! ```

use std::fmt;
use thiserror::Error;

/// Maximum number of entries each registry (directories, files) holds.
///
/// Appends past this bound fail with [`FsError::TableFull`]; nothing is
/// ever evicted to make room.
pub const MAX_ENTRIES: usize = 256;

/// Maximum length of an entry name in bytes. Longer names are truncated
/// on insertion, matching kernel `NAME_MAX`.
pub const NAME_MAX: usize = 255;

/// Maximum length of a file's content in bytes. Writes past this bound
/// are truncated, not rejected.
pub const CONTENT_MAX: usize = 255;

/// Errors surfaced by filesystem operations.
///
/// `NotFound` is the only error the read/write/attribute handlers
/// produce; `TableFull` is the only one the creation handlers produce.
///
/// # Examples
///
/// ```
/// use flatfs_core::FsError;
///
/// let err = FsError::NotFound { path: "/missing".to_string() };
/// assert!(err.is_not_found());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// The path does not resolve to the root, a directory, or a file.
    #[error("no such entry: {path}")]
    NotFound {
        /// The path that failed to resolve.
        path: String,
    },

    /// The registry for this entry kind is at capacity.
    #[error("{kind} registry is full ({MAX_ENTRIES} entries)")]
    TableFull {
        /// Which registry saturated.
        kind: EntryKind,
    },
}

impl FsError {
    /// Returns `true` if this is a path-resolution failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if a registry hit its capacity bound.
    #[must_use]
    pub const fn is_table_full(&self) -> bool {
        matches!(self, Self::TableFull { .. })
    }
}

/// The kind of a namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory (including the mount root).
    Directory,
    /// A regular file.
    RegularFile,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => f.write_str("directory"),
            Self::RegularFile => f.write_str("file"),
        }
    }
}

/// Attributes of a namespace entry, as reported to the kernel bridge.
///
/// Only what the core models is here: kind, permission bits, link count
/// and size. Ownership and timestamps are an OS concern and are filled
/// in by the bridge adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
    /// Directory or regular file.
    pub kind: EntryKind,
    /// Fixed permission bits (0o755 for directories, 0o644 for files).
    pub perm: u16,
    /// Hard-link count (2 for directories, 1 for files).
    pub nlink: u32,
    /// Content length in bytes; always 0 for directories.
    pub size: u64,
}

impl Attributes {
    /// Attributes of a directory, including the mount root.
    #[must_use]
    pub const fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            perm: 0o755,
            nlink: 2,
            size: 0,
        }
    }

    /// Attributes of a regular file with the given content length.
    #[must_use]
    pub const fn file(size: u64) -> Self {
        Self {
            kind: EntryKind::RegularFile,
            perm: 0o644,
            nlink: 1,
            size,
        }
    }
}
