//! Integration tests driving the public filesystem API end to end:
//! creation, attribute synthesis, listing, and offset-bounded I/O.

use flatfs_core::{CONTENT_MAX, EntryKind, FlatFs, MAX_ENTRIES};

/// Unknown paths fail attribute lookup; the root never does.
#[test]
fn test_root_always_resolves_unknown_paths_never_do() {
    let fs = FlatFs::new();

    let root = fs.attributes("/").unwrap();
    assert_eq!(root.kind, EntryKind::Directory);
    assert_eq!(root.nlink, 2);

    assert!(fs.attributes("/ghost").unwrap_err().is_not_found());
    assert!(fs.attributes("/ghost.txt").unwrap_err().is_not_found());
}

/// mkdir makes the new name visible in attributes and in the root
/// listing, exactly once more than before.
#[test]
fn test_mkdir_visible_in_attributes_and_listing() {
    let mut fs = FlatFs::new();
    let before = fs.read_dir("/").iter().filter(|n| *n == "docs").count();

    fs.mkdir("/docs").unwrap();

    let attr = fs.attributes("/docs").unwrap();
    assert_eq!(attr.kind, EntryKind::Directory);
    assert_eq!(attr.perm, 0o755);

    let after = fs.read_dir("/").iter().filter(|n| *n == "docs").count();
    assert_eq!(after, before + 1);
}

/// A fresh file reports file attributes with size 0.
#[test]
fn test_create_file_starts_at_size_zero() {
    let mut fs = FlatFs::new();
    fs.create_file("/empty.txt").unwrap();

    let attr = fs.attributes("/empty.txt").unwrap();
    assert_eq!(attr.kind, EntryKind::RegularFile);
    assert_eq!(attr.perm, 0o644);
    assert_eq!(attr.nlink, 1);
    assert_eq!(attr.size, 0);
}

/// The root listing yields ".", "..", then directories, then files,
/// all in insertion order.
#[test]
fn test_root_listing_order() {
    let mut fs = FlatFs::new();
    fs.create_file("/z.txt").unwrap();
    fs.mkdir("/b").unwrap();
    fs.mkdir("/a").unwrap();
    fs.create_file("/y.txt").unwrap();

    assert_eq!(fs.read_dir("/"), vec![".", "..", "b", "a", "z.txt", "y.txt"]);
}

/// Write-then-read round-trips arbitrary data up to the content cap.
#[test]
fn test_write_read_round_trip() {
    let mut fs = FlatFs::new();
    fs.create_file("/data").unwrap();

    for payload in [&b"hello"[..], b"", b"a\0b\0c", &[0xffu8; 255]] {
        let written = fs.write("/data", payload, 0).unwrap();
        assert_eq!(written, payload.len());
        assert_eq!(
            fs.read("/data", u32::try_from(payload.len()).unwrap(), 0)
                .unwrap(),
            payload
        );
    }
}

/// Writing at an offset past the end zero-fills the gap.
#[test]
fn test_sparse_write_semantics() {
    let mut fs = FlatFs::new();
    fs.create_file("/sparse").unwrap();

    assert_eq!(fs.write("/sparse", b"X", 5).unwrap(), 1);
    assert_eq!(fs.read("/sparse", 10, 0).unwrap(), &[0, 0, 0, 0, 0, b'X']);
    assert_eq!(fs.attributes("/sparse").unwrap().size, 6);
}

/// A 300-byte payload stores exactly the cap; size never exceeds it.
#[test]
fn test_oversized_write_truncates() {
    let mut fs = FlatFs::new();
    fs.create_file("/big").unwrap();

    let payload = vec![b'q'; 300];
    assert_eq!(fs.write("/big", &payload, 0).unwrap(), CONTENT_MAX);
    assert_eq!(fs.attributes("/big").unwrap().size, CONTENT_MAX as u64);
}

/// Reading at the current content length is end-of-data, not an error.
#[test]
fn test_read_at_end_is_empty() {
    let mut fs = FlatFs::new();
    fs.create_file("/f").unwrap();
    fs.write("/f", b"hello", 0).unwrap();

    assert_eq!(fs.read("/f", 10, 5).unwrap(), b"");
}

/// The 257th directory is dropped: count stays at capacity, nothing
/// crashes, and the filesystem keeps serving requests.
#[test]
fn test_directory_capacity_boundary() {
    let mut fs = FlatFs::new();
    for i in 0..MAX_ENTRIES {
        fs.mkdir(&format!("/d{i}")).unwrap();
    }

    assert!(fs.mkdir("/one-too-many").unwrap_err().is_table_full());
    assert_eq!(fs.table().dir_count(), MAX_ENTRIES);
    assert!(fs.attributes("/one-too-many").unwrap_err().is_not_found());
    assert_eq!(fs.attributes("/d0").unwrap().kind, EntryKind::Directory);
}

/// The concrete end-to-end scenario: create, write, read back, stat.
#[test]
fn test_create_write_read_scenario() {
    let mut fs = FlatFs::new();
    fs.create_file("/a.txt").unwrap();
    fs.write("/a.txt", b"hello", 0).unwrap();

    assert_eq!(fs.read("/a.txt", 5, 0).unwrap(), b"hello");
    assert_eq!(fs.attributes("/a.txt").unwrap().size, 5);
}

/// Overlapping rewrite: content ends right after the last byte written.
#[test]
fn test_rewrite_places_end_after_last_byte() {
    let mut fs = FlatFs::new();
    fs.create_file("/f").unwrap();
    fs.write("/f", b"hello world", 0).unwrap();
    fs.write("/f", b"HI", 6).unwrap();

    assert_eq!(fs.read("/f", 64, 0).unwrap(), b"hello HI");
    assert_eq!(fs.attributes("/f").unwrap().size, 8);
}

/// Duplicate names may coexist; lookups keep reporting the first one.
#[test]
fn test_duplicate_names_coexist() {
    let mut fs = FlatFs::new();
    fs.create_file("/dup").unwrap();
    fs.write("/dup", b"first", 0).unwrap();
    fs.create_file("/dup").unwrap();

    let listed = fs.read_dir("/").iter().filter(|n| *n == "dup").count();
    assert_eq!(listed, 2);
    // The second entry is shadowed: reads still see the first.
    assert_eq!(fs.read("/dup", 5, 0).unwrap(), b"first");
}
