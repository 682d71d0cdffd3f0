//! In-memory flat-namespace filesystem core.
//!
//! `flatfs-core` owns all filesystem state for a mounted process: a
//! bounded registry of directory names and file entries living directly
//! under the mount root, plus the six request handlers a kernel bridge
//! dispatches against it (attributes, listing, read, write,
//! make-directory, make-file).
//!
//! The crate is deliberately OS-free: no inodes, no uids, no clocks.
//! Those are synthesized by the bridge adapter that mounts a [`FlatFs`].
//!
//! # Examples
//!
//! ```
//! use flatfs_core::FlatFs;
//!
//! let mut fs = FlatFs::new();
//! fs.create_file("/a.txt").unwrap();
//! fs.write("/a.txt", b"hello", 0).unwrap();
//!
//! assert_eq!(fs.read("/a.txt", 5, 0).unwrap(), b"hello");
//! assert_eq!(fs.attributes("/a.txt").unwrap().size, 5);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod fs;
pub mod table;
pub mod types;

pub use fs::{FlatFs, Lookup};
pub use table::EntryTable;
pub use types::{Attributes, CONTENT_MAX, EntryKind, FsError, MAX_ENTRIES, NAME_MAX};
