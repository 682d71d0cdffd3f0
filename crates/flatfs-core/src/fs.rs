//! Path lookup and the six request handlers.
//!
//! [`FlatFs`] owns an [`EntryTable`] and implements the operations a
//! kernel bridge dispatches against a mounted filesystem: attribute
//! lookup, directory listing, byte-range read and write, and the two
//! creation operations. Every handler is a synchronous, bounded-time
//! computation over the table; the bridge is expected to serialize
//! calls (the core holds no lock).
//!
//! Paths are root-relative strings: the mount root is `"/"`, everything
//! else is matched by exact string equality against the path with its
//! leading separator removed. The namespace is flat and the registries
//! are capped at 256 entries, so resolution is a linear scan.

use crate::table::EntryTable;
use crate::types::{Attributes, FsError};
use tracing::debug;

/// What a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The mount root itself.
    Root,
    /// A directory, with its registry index.
    Directory(usize),
    /// A file, with its registry index.
    File(usize),
    /// Nothing under this name.
    NotFound,
}

/// An in-memory filesystem with a flat root namespace.
///
/// Constructed empty at mount; dropping it at unmount discards all
/// state. Entries are append-only: there is no deletion, rename, or
/// persistence.
///
/// # Examples
///
/// ```
/// use flatfs_core::FlatFs;
///
/// let mut fs = FlatFs::new();
/// fs.mkdir("/docs").unwrap();
/// fs.create_file("/a.txt").unwrap();
///
/// let names = fs.read_dir("/");
/// assert_eq!(names, vec![".", "..", "docs", "a.txt"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlatFs {
    table: EntryTable,
}

impl FlatFs {
    /// Creates an empty filesystem.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: EntryTable::new(),
        }
    }

    /// Shared access to the underlying entry table.
    #[must_use]
    pub const fn table(&self) -> &EntryTable {
        &self.table
    }

    /// Resolves a path to an entry classification.
    ///
    /// The leading separator is stripped and the remainder is compared
    /// for exact equality, directories first. Under duplicate names the
    /// first match by insertion order wins.
    #[must_use]
    pub fn classify(&self, path: &str) -> Lookup {
        if path == "/" {
            return Lookup::Root;
        }
        let name = path.strip_prefix('/').unwrap_or(path);
        if let Some(index) = self.table.find_dir(name) {
            Lookup::Directory(index)
        } else if let Some(index) = self.table.find_file(name) {
            Lookup::File(index)
        } else {
            Lookup::NotFound
        }
    }

    /// Attributes of the entry at `path`.
    ///
    /// The root and every directory report fixed directory attributes;
    /// files report their current content length as size.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if the path resolves to nothing.
    pub fn attributes(&self, path: &str) -> Result<Attributes, FsError> {
        match self.classify(path) {
            Lookup::Root | Lookup::Directory(_) => Ok(Attributes::directory()),
            Lookup::File(index) => {
                let size = self.table.file(index).map_or(0, |f| f.content().len());
                Ok(Attributes::file(size as u64))
            }
            Lookup::NotFound => Err(FsError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    /// Lists the entry names visible at `path`.
    ///
    /// The pseudo-entries `"."` and `".."` always come first. The root
    /// additionally yields every directory name, then every file name,
    /// in insertion order. Any other path yields only the two
    /// pseudo-entries: the namespace is flat, so a subdirectory never
    /// has children of its own.
    #[must_use]
    pub fn read_dir(&self, path: &str) -> Vec<String> {
        let mut names = vec![".".to_string(), "..".to_string()];
        if path == "/" {
            names.extend(self.table.dir_names().map(str::to_string));
            names.extend(self.table.file_names().map(str::to_string));
        }
        debug!(path, count = names.len(), "read_dir");
        names
    }

    /// Reads up to `size` bytes of the file at `path`, starting at
    /// `offset`.
    ///
    /// An offset at or past the content length yields an empty slice.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if `path` is not a file.
    pub fn read(&self, path: &str, size: u32, offset: u64) -> Result<&[u8], FsError> {
        let Lookup::File(index) = self.classify(path) else {
            return Err(FsError::NotFound {
                path: path.to_string(),
            });
        };
        let Some(file) = self.table.file(index) else {
            // classify only hands out live indices
            debug_assert!(false, "stale file index {index}");
            return Ok(&[]);
        };
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let data = file.content().read(offset, size as usize);
        debug!(path, offset, requested = size, returned = data.len(), "read");
        Ok(data)
    }

    /// Writes `data` into the file at `path` at `offset` and returns
    /// the number of bytes stored.
    ///
    /// Content is capped at [`CONTENT_MAX`](crate::CONTENT_MAX) bytes:
    /// a write past the cap is truncated, and an offset at or past the
    /// cap stores nothing and returns 0. A gap between the old length
    /// and `offset` is zero-filled.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if `path` is not a file.
    pub fn write(&mut self, path: &str, data: &[u8], offset: u64) -> Result<usize, FsError> {
        let Lookup::File(index) = self.classify(path) else {
            return Err(FsError::NotFound {
                path: path.to_string(),
            });
        };
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let written = self
            .table
            .file_mut(index)
            .map_or(0, |f| f.content_mut().write(offset, data));
        debug!(path, offset, requested = data.len(), written, "write");
        Ok(written)
    }

    /// Creates a directory named by `path` (leading separator stripped)
    /// and returns its registry index.
    ///
    /// Duplicate names are not rejected; the new entry is simply
    /// appended and remains shadowed by the first one in lookups.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::TableFull`] when the directory registry is at
    /// capacity. The table is unchanged in that case.
    pub fn mkdir(&mut self, path: &str) -> Result<usize, FsError> {
        let name = path.strip_prefix('/').unwrap_or(path);
        let index = self.table.push_dir(name)?;
        debug!(path, index, "mkdir");
        Ok(index)
    }

    /// Creates an empty file named by `path` (leading separator
    /// stripped) and returns its registry index.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::TableFull`] when the file registry is at
    /// capacity. The table is unchanged in that case.
    pub fn create_file(&mut self, path: &str) -> Result<usize, FsError> {
        let name = path.strip_prefix('/').unwrap_or(path);
        let index = self.table.push_file(name)?;
        debug!(path, index, "create_file");
        Ok(index)
    }
}
