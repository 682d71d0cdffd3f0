//! FUSE bridge adapter for `flatfs`.
//!
//! Maps the kernel's inode-based FUSE protocol onto the path-based
//! [`FlatFs`] core. The core never deletes or renames entries, so every
//! registry index maps to a permanently stable inode:
//!
//! - the mount root is `FUSE_ROOT_ID` (1),
//! - directory `i` is `2 + i`,
//! - file `i` is `2 + MAX_ENTRIES + i`.
//!
//! `lookup` reconstructs a path from `(parent, name)` and classifies it
//! against the core; everything OS-flavored (ownership, timestamps,
//! errno values) is synthesized here. Ownership reports the user who
//! mounted the filesystem, captured once at construction; access and
//! modification times always report the current wall clock, as the core
//! does not track time.

#![warn(missing_docs, missing_debug_implementations)]

use std::ffi::OsStr;
use std::time::{Duration, SystemTime};

use flatfs_core::{Attributes, EntryKind, FlatFs, FsError, Lookup, MAX_ENTRIES};
use fuser::{
    FUSE_ROOT_ID, FileAttr, FileType, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEntry, ReplyWrite, Request,
};
use libc::{EINVAL, ENOENT, ENOSPC, c_int};
use tracing::{debug, info, warn};

/// How long the kernel may cache attributes and entries.
const TTL: Duration = Duration::from_secs(1);

/// First inode of the directory range.
const DIR_INO_BASE: u64 = FUSE_ROOT_ID + 1;

/// First inode of the file range.
const FILE_INO_BASE: u64 = DIR_INO_BASE + MAX_ENTRIES as u64;

/// The mounted filesystem: a [`FlatFs`] core plus the identity of the
/// mounting user.
///
/// `fuser`'s session loop dispatches every operation through
/// `&mut self` on a single thread, which serializes all access to the
/// core; no internal locking is needed.
#[derive(Debug)]
pub struct FlatFuse {
    fs: FlatFs,
    uid: u32,
    gid: u32,
}

impl Default for FlatFuse {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatFuse {
    /// Creates an empty filesystem owned by the current user.
    #[must_use]
    pub fn new() -> Self {
        // getuid/getgid cannot fail and have no safety preconditions.
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        Self::with_owner(uid, gid)
    }

    /// Creates an empty filesystem reporting the given owner.
    #[must_use]
    pub const fn with_owner(uid: u32, gid: u32) -> Self {
        Self {
            fs: FlatFs::new(),
            uid,
            gid,
        }
    }

    /// The inode for a classified entry; `None` for `NotFound`.
    const fn ino_for(lookup: Lookup) -> Option<u64> {
        match lookup {
            Lookup::Root => Some(FUSE_ROOT_ID),
            Lookup::Directory(index) => Some(DIR_INO_BASE + index as u64),
            Lookup::File(index) => Some(FILE_INO_BASE + index as u64),
            Lookup::NotFound => None,
        }
    }

    /// Resolves an inode back to a root-relative path.
    fn entry_path(&self, ino: u64) -> Option<String> {
        if ino == FUSE_ROOT_ID {
            return Some("/".to_string());
        }
        let table = self.fs.table();
        if ino >= FILE_INO_BASE {
            let index = usize::try_from(ino - FILE_INO_BASE).ok()?;
            return table.file(index).map(|f| format!("/{}", f.name()));
        }
        let index = usize::try_from(ino - DIR_INO_BASE).ok()?;
        table.dir_name(index).map(|name| format!("/{name}"))
    }

    /// Reconstructs the path the original path-based bridge would have
    /// handed us for `(parent, name)`.
    ///
    /// Under a directory parent this yields `/dir/name`, which the flat
    /// core matches as a single literal name, preserving the original
    /// driver's treatment of nested paths.
    fn full_path(&self, parent: u64, name: &OsStr) -> Option<String> {
        let name = name.to_string_lossy();
        if parent == FUSE_ROOT_ID {
            return Some(format!("/{name}"));
        }
        if parent >= FILE_INO_BASE {
            return None;
        }
        let index = usize::try_from(parent - DIR_INO_BASE).ok()?;
        let dir = self.fs.table().dir_name(index)?;
        Some(format!("/{dir}/{name}"))
    }

    /// Fills in the OS-level attribute fields the core does not model.
    fn file_attr(&self, ino: u64, attr: Attributes) -> FileAttr {
        let now = SystemTime::now();
        FileAttr {
            ino,
            size: attr.size,
            blocks: attr.size.div_ceil(512),
            atime: now,
            mtime: now,
            ctime: now,
            crtime: now,
            kind: file_type(attr.kind),
            perm: attr.perm,
            nlink: attr.nlink,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: 512,
            flags: 0,
        }
    }

    /// Classifies a path and synthesizes its FUSE attributes.
    fn attr_for_path(&self, path: &str) -> Option<FileAttr> {
        let ino = Self::ino_for(self.fs.classify(path))?;
        let attr = self.fs.attributes(path).ok()?;
        Some(self.file_attr(ino, attr))
    }
}

const fn file_type(kind: EntryKind) -> FileType {
    match kind {
        EntryKind::Directory => FileType::Directory,
        EntryKind::RegularFile => FileType::RegularFile,
    }
}

impl fuser::Filesystem for FlatFuse {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), c_int> {
        info!("flatfs mounted");
        Ok(())
    }

    fn destroy(&mut self) {
        info!("flatfs unmounted, all entries discarded");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(path) = self.full_path(parent, name) else {
            reply.error(ENOENT);
            return;
        };
        match self.attr_for_path(&path) {
            Some(attr) => reply.entry(&TTL, &attr, 0),
            None => reply.error(ENOENT),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let attr = self.entry_path(ino).and_then(|p| self.attr_for_path(&p));
        match attr {
            Some(attr) => reply.attr(&TTL, &attr),
            None => reply.error(ENOENT),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let Some(path) = self.entry_path(ino) else {
            reply.error(ENOENT);
            return;
        };
        let Ok(offset) = usize::try_from(offset) else {
            reply.error(EINVAL);
            return;
        };

        let names = self.fs.read_dir(&path);
        for (i, name) in names.iter().enumerate().skip(offset) {
            let (entry_ino, kind) = match name.as_str() {
                "." => (ino, FileType::Directory),
                // Every listable directory hangs off the root.
                ".." => (FUSE_ROOT_ID, FileType::Directory),
                other => {
                    let lookup = self.fs.classify(&format!("/{other}"));
                    let Some(entry_ino) = Self::ino_for(lookup) else {
                        continue;
                    };
                    let kind = match lookup {
                        Lookup::File(_) => FileType::RegularFile,
                        _ => FileType::Directory,
                    };
                    (entry_ino, kind)
                }
            };
            let next = i64::try_from(i + 1).unwrap_or(i64::MAX);
            if reply.add(entry_ino, next, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let Some(path) = self.entry_path(ino) else {
            reply.error(ENOENT);
            return;
        };
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(EINVAL);
            return;
        };
        match self.fs.read(&path, size, offset) {
            Ok(data) => reply.data(data),
            Err(FsError::NotFound { .. }) => reply.error(ENOENT),
            Err(err) => {
                warn!(%err, path, "unexpected read failure");
                reply.error(EINVAL);
            }
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let Some(path) = self.entry_path(ino) else {
            reply.error(ENOENT);
            return;
        };
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(EINVAL);
            return;
        };
        match self.fs.write(&path, data, offset) {
            // Content is capped far below u32::MAX.
            Ok(written) => reply.written(u32::try_from(written).unwrap_or(u32::MAX)),
            Err(FsError::NotFound { .. }) => reply.error(ENOENT),
            Err(err) => {
                warn!(%err, path, "unexpected write failure");
                reply.error(EINVAL);
            }
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let Some(path) = self.full_path(parent, name) else {
            reply.error(ENOENT);
            return;
        };
        match self.fs.mkdir(&path) {
            Ok(index) => {
                debug!(path, index, "mkdir");
                let ino = DIR_INO_BASE + index as u64;
                reply.entry(&TTL, &self.file_attr(ino, Attributes::directory()), 0);
            }
            Err(err) => {
                warn!(%err, path, "mkdir rejected");
                reply.error(ENOSPC);
            }
        }
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        let Some(path) = self.full_path(parent, name) else {
            reply.error(ENOENT);
            return;
        };
        match self.fs.create_file(&path) {
            Ok(index) => {
                debug!(path, index, "mknod");
                let ino = FILE_INO_BASE + index as u64;
                reply.entry(&TTL, &self.file_attr(ino, Attributes::file(0)), 0);
            }
            Err(err) => {
                warn!(%err, path, "mknod rejected");
                reply.error(ENOSPC);
            }
        }
    }
}
