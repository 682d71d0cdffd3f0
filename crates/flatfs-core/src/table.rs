//! The entry table: bounded registries of directories and files.
//!
//! All filesystem state for a mounted process lives here. Both
//! registries are append-only (no deletion, no rename) and capped at
//! [`MAX_ENTRIES`]; a file's name and content are one entity, so there
//! is no index-alignment invariant to maintain between them.

use crate::types::{CONTENT_MAX, EntryKind, FsError, MAX_ENTRIES, NAME_MAX};
use tracing::warn;

/// A file's content: a byte buffer capped at [`CONTENT_MAX`] bytes.
///
/// Reads are bounded by the current length; writes truncate at the cap
/// and zero-fill any gap left by an offset past the current end.
///
/// # Examples
///
/// ```
/// use flatfs_core::table::Content;
///
/// let mut content = Content::new();
/// content.write(5, b"X");
///
/// // Sparse write: the gap reads back as zeros.
/// assert_eq!(content.len(), 6);
/// assert_eq!(content.read(0, 10), &[0, 0, 0, 0, 0, b'X']);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    bytes: Vec<u8>,
}

impl Content {
    /// Creates an empty content buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Current content length in bytes. Never exceeds [`CONTENT_MAX`].
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if no byte has been written yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads up to `size` bytes starting at `offset`.
    ///
    /// An offset at or past the current length yields an empty slice
    /// (end-of-data, not an error). Never reads past the length.
    #[must_use]
    pub fn read(&self, offset: usize, size: usize) -> &[u8] {
        if offset >= self.bytes.len() {
            return &[];
        }
        let end = offset.saturating_add(size).min(self.bytes.len());
        &self.bytes[offset..end]
    }

    /// Writes `data` at `offset` and returns the number of bytes stored.
    ///
    /// The content length becomes `min(offset + data.len(), CONTENT_MAX)`:
    /// a write always places the end of content right after its last
    /// byte, truncating anything that was beyond it. A gap between the
    /// old length and `offset` is zero-filled. An offset at or past
    /// [`CONTENT_MAX`] stores nothing and returns 0.
    pub fn write(&mut self, offset: usize, data: &[u8]) -> usize {
        if offset >= CONTENT_MAX {
            return 0;
        }
        let new_len = offset.saturating_add(data.len()).min(CONTENT_MAX);
        let written = new_len - offset;
        // Zero-fills up to the offset, or cuts back to it.
        self.bytes.resize(offset, 0);
        self.bytes.extend_from_slice(&data[..written]);
        written
    }
}

/// A regular file: name and content as one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    content: Content,
}

impl FileEntry {
    fn new(name: String) -> Self {
        Self {
            name,
            content: Content::new(),
        }
    }

    /// The file's name (basename under the mount root).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared access to the file's content.
    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// Mutable access to the file's content.
    pub fn content_mut(&mut self) -> &mut Content {
        &mut self.content
    }
}

/// Bounded, append-only registries of directory and file entries.
///
/// This is the single source of truth for all filesystem state. It is
/// owned by the mounted filesystem value: constructed empty at mount,
/// dropped at unmount, never shared as a global.
///
/// Duplicate names are not rejected; lookups return the first match by
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct EntryTable {
    dirs: Vec<String>,
    files: Vec<FileEntry>,
}

impl EntryTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Appends a directory and returns its index.
    ///
    /// Names longer than [`NAME_MAX`] bytes are truncated on a UTF-8
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::TableFull`] when the directory registry
    /// already holds [`MAX_ENTRIES`] entries; the table is unchanged.
    pub fn push_dir(&mut self, name: &str) -> Result<usize, FsError> {
        if self.dirs.len() >= MAX_ENTRIES {
            warn!(name, "directory registry saturated, entry dropped");
            return Err(FsError::TableFull {
                kind: EntryKind::Directory,
            });
        }
        self.dirs.push(bounded_name(name));
        Ok(self.dirs.len() - 1)
    }

    /// Appends a file with empty content and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::TableFull`] when the file registry already
    /// holds [`MAX_ENTRIES`] entries; the table is unchanged.
    pub fn push_file(&mut self, name: &str) -> Result<usize, FsError> {
        if self.files.len() >= MAX_ENTRIES {
            warn!(name, "file registry saturated, entry dropped");
            return Err(FsError::TableFull {
                kind: EntryKind::RegularFile,
            });
        }
        self.files.push(FileEntry::new(bounded_name(name)));
        Ok(self.files.len() - 1)
    }

    /// Number of directories.
    #[must_use]
    pub const fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    /// Number of files.
    #[must_use]
    pub const fn file_count(&self) -> usize {
        self.files.len()
    }

    /// The name of directory `index`, if it exists.
    #[must_use]
    pub fn dir_name(&self, index: usize) -> Option<&str> {
        self.dirs.get(index).map(String::as_str)
    }

    /// The file at `index`, if it exists.
    #[must_use]
    pub fn file(&self, index: usize) -> Option<&FileEntry> {
        self.files.get(index)
    }

    /// Mutable access to the file at `index`, if it exists.
    pub fn file_mut(&mut self, index: usize) -> Option<&mut FileEntry> {
        self.files.get_mut(index)
    }

    /// Directory names in insertion order.
    pub fn dir_names(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    /// File names in insertion order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(FileEntry::name)
    }

    /// Index of the first directory named `name`, by insertion order.
    #[must_use]
    pub fn find_dir(&self, name: &str) -> Option<usize> {
        self.dirs.iter().position(|d| d == name)
    }

    /// Index of the first file named `name`, by insertion order.
    #[must_use]
    pub fn find_file(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name == name)
    }
}

/// Truncates `name` to at most [`NAME_MAX`] bytes on a char boundary.
fn bounded_name(name: &str) -> String {
    if name.len() <= NAME_MAX {
        return name.to_string();
    }
    let mut end = NAME_MAX;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}
