//! Tests for Store operations
//!
//! These tests verify:
//! - Create/read/delete/list semantics
//! - Uniqueness and input validation
//! - Monotonic allocation (deleted space is never reused)
//! - Capacity boundaries (slots and bytes)
//! - Read-only handles and read size limits

use std::path::PathBuf;

use stegfs::container::{self, capacity_for};
use stegfs::directory::MAX_FILES;
use stegfs::{StegError, Store, StoreConfig, SyncMode};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const WIDTH: u32 = 256;
const HEIGHT: u32 = 256;

fn setup_temp_carrier() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cover.bmp");
    container::create_carrier(&path, WIDTH, HEIGHT).unwrap();
    (temp_dir, path)
}

fn setup_temp_store() -> (TempDir, Store) {
    let (temp_dir, path) = setup_temp_carrier();
    let store = Store::open(&path).unwrap();
    (temp_dir, store)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_empty_carrier() {
    let (_temp, store) = setup_temp_store();

    assert_eq!(store.file_count(), 0);
    assert!(store.list().is_empty());
    assert_eq!(store.directory().discarded(), 0);
}

#[test]
fn test_create_and_read() {
    let (_temp, mut store) = setup_temp_store();

    let entry = store.create("hello.txt", b"hello world").unwrap();
    let data = store.read("hello.txt").unwrap();

    assert_eq!(&data[..], b"hello world");
    assert_eq!(entry.size, 11);
    assert_eq!(entry.offset, store.container().payload_start());
    assert_eq!(store.file_count(), 1);
}

#[test]
fn test_round_trip_sizes() {
    let (_temp, mut store) = setup_temp_store();

    for (i, size) in [1usize, 2, 255, 4096, 65_537].iter().enumerate() {
        let data: Vec<u8> = (0..*size).map(|b| (b * 31 + i) as u8).collect();
        let name = format!("file{}", i);

        store.create(&name, &data).unwrap();

        assert_eq!(&store.read(&name).unwrap()[..], &data[..]);
    }
}

#[test]
fn test_round_trip_binary_content() {
    let (_temp, mut store) = setup_temp_store();
    let data: Vec<u8> = (0..=255u8).collect();

    store.create("bytes.bin", &data).unwrap();

    assert_eq!(&store.read("bytes.bin").unwrap()[..], &data[..]);
}

#[test]
fn test_read_into_streams_contents() {
    let (_temp, mut store) = setup_temp_store();
    store.create("a", b"streamed").unwrap();

    let mut out = Vec::new();
    let copied = store.read_into("a", &mut out).unwrap();

    assert_eq!(copied, 8);
    assert_eq!(out, b"streamed");
}

#[test]
fn test_read_missing() {
    let (_temp, mut store) = setup_temp_store();

    let err = store.read("nope").unwrap_err();

    assert!(matches!(err, StegError::FileNotFound(ref n) if n == "nope"));
    assert!(err.is_not_found());
    assert!(matches!(
        store.read_into("nope", &mut Vec::new()),
        Err(StegError::FileNotFound(_))
    ));
}

#[test]
fn test_delete() {
    let (_temp, mut store) = setup_temp_store();
    store.create("a", b"aaa").unwrap();
    store.create("b", b"bbb").unwrap();

    let removed = store.delete("a").unwrap();

    assert_eq!(removed.name, b"a");
    assert_eq!(store.file_count(), 1);
    assert!(matches!(store.read("a"), Err(StegError::FileNotFound(_))));
    assert_eq!(&store.read("b").unwrap()[..], b"bbb");
}

#[test]
fn test_delete_missing() {
    let (_temp, mut store) = setup_temp_store();
    store.create("a", b"aaa").unwrap();

    let result = store.delete("b");

    assert!(matches!(result, Err(StegError::FileNotFound(_))));
    assert_eq!(store.file_count(), 1);
}

#[test]
fn test_list_is_slot_ordered() {
    let (_temp, mut store) = setup_temp_store();
    store.create("one", b"1").unwrap();
    store.create("two", b"22").unwrap();
    store.create("three", b"333").unwrap();
    store.delete("one").unwrap();
    store.create("four", b"4444").unwrap();

    let listing = store.list();

    assert_eq!(
        listing,
        vec![
            ("four".to_string(), 4),
            ("two".to_string(), 2),
            ("three".to_string(), 3),
        ]
    );
}

#[test]
fn test_create_after_middle_delete_keeps_higher_slots() {
    let (_temp, mut store) = setup_temp_store();
    store.create("a", b"a").unwrap();
    store.create("b", b"b").unwrap();
    store.create("c", b"c").unwrap();

    store.delete("b").unwrap();
    store.create("d", b"d").unwrap();

    assert_eq!(store.directory().slot(1).unwrap().name, b"d");
    assert_eq!(store.directory().slot(2).unwrap().name, b"c");
    assert_eq!(&store.read("c").unwrap()[..], b"c");
    assert_eq!(store.file_count(), 3);
}

#[test]
fn test_stat_and_checksum() {
    let (_temp, mut store) = setup_temp_store();
    store.create("a", b"123456789").unwrap();

    let entry = store.stat("a").unwrap().clone();
    let crc = store.checksum("a").unwrap();

    assert_eq!(entry.size, 9);
    // CRC-32/ISO-HDLC check value
    assert_eq!(crc, 0xCBF4_3926);
    assert!(store.stat("b").is_none());
}

// =============================================================================
// Uniqueness and Validation Tests
// =============================================================================

#[test]
fn test_create_duplicate_leaves_directory_unchanged() {
    let (_temp, mut store) = setup_temp_store();
    store.create("a", b"first").unwrap();
    let before: Vec<_> = store.entries().cloned().collect();
    let usage_before = store.usage();

    let result = store.create("a", b"second");

    assert!(matches!(result, Err(StegError::AlreadyExists(ref n)) if n == "a"));
    let after: Vec<_> = store.entries().cloned().collect();
    assert_eq!(before, after);
    assert_eq!(store.usage(), usage_before);
    assert_eq!(&store.read("a").unwrap()[..], b"first");
}

#[test]
fn test_names_are_case_sensitive() {
    let (_temp, mut store) = setup_temp_store();

    store.create("File", b"upper").unwrap();
    store.create("file", b"lower").unwrap();

    assert_eq!(&store.read("File").unwrap()[..], b"upper");
    assert_eq!(&store.read("file").unwrap()[..], b"lower");
}

#[test]
fn test_create_empty_payload() {
    let (_temp, mut store) = setup_temp_store();

    let result = store.create("empty", b"");

    assert!(matches!(result, Err(StegError::EmptyFile(_))));
    assert_eq!(store.file_count(), 0);
}

#[test]
fn test_create_invalid_names() {
    let (_temp, mut store) = setup_temp_store();

    assert!(matches!(store.create("", b"x"), Err(StegError::InvalidName(_))));
    assert!(matches!(
        store.create(&"n".repeat(256), b"x"),
        Err(StegError::InvalidName(_))
    ));
    assert!(store.create(&"n".repeat(255), b"x").is_ok());
}

// =============================================================================
// Allocation Tests
// =============================================================================

#[test]
fn test_allocation_is_contiguous_append() {
    let (_temp, mut store) = setup_temp_store();

    let a = store.create("a", &[1u8; 100]).unwrap();
    let b = store.create("b", &[2u8; 30]).unwrap();

    assert_eq!(b.offset, a.end());
}

#[test]
fn test_deletion_does_not_reclaim_space() {
    let (_temp, mut store) = setup_temp_store();

    let a = store.create("a", &[7u8; 100]).unwrap();
    store.delete("a").unwrap();
    let b = store.create("b", &[8u8; 50]).unwrap();

    assert!(b.offset >= a.end());
}

#[test]
fn test_allocation_is_monotonic_across_mixed_operations() {
    let (_temp, mut store) = setup_temp_store();
    let mut max_end = 0;

    for i in 0..20u64 {
        let name = format!("f{}", i);
        let entry = store.create(&name, &vec![i as u8; (i as usize % 7) + 1]).unwrap();
        assert!(entry.offset >= max_end);
        max_end = max_end.max(entry.end());

        if i % 3 == 0 {
            store.delete(&name).unwrap();
        }
    }
}

#[test]
fn test_usage_tracks_high_water() {
    let (_temp, mut store) = setup_temp_store();
    let initial = store.usage();

    store.create("a", &[0u8; 500]).unwrap();
    store.delete("a").unwrap();
    let usage = store.usage();

    assert_eq!(initial.high_water, initial.payload_start);
    assert_eq!(initial.free_bytes, capacity_for(WIDTH, HEIGHT));
    assert_eq!(usage.high_water, initial.payload_start + 500);
    assert_eq!(usage.free_bytes, initial.free_bytes - 500);
    assert_eq!(usage.file_count, 0);
    assert_eq!(usage.capacity, MAX_FILES);
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_directory_full() {
    let (_temp, mut store) = setup_temp_store();

    for i in 0..MAX_FILES {
        store.create(&format!("file{:03}", i), b"x").unwrap();
    }
    let result = store.create("one_too_many", b"x");

    assert!(matches!(
        result,
        Err(StegError::DirectoryFull { capacity: MAX_FILES })
    ));
    assert_eq!(store.file_count(), MAX_FILES);
    assert!(store.stat("one_too_many").is_none());
}

#[test]
fn test_directory_full_then_delete_frees_slot() {
    let (_temp, mut store) = setup_temp_store();
    for i in 0..MAX_FILES {
        store.create(&format!("file{:03}", i), b"x").unwrap();
    }

    store.delete("file042").unwrap();
    store.create("replacement", b"y").unwrap();

    assert_eq!(store.directory().slot(42).unwrap().name, b"replacement");
}

#[test]
fn test_payload_exceeds_space() {
    let (_temp, mut store) = setup_temp_store();
    let capacity = capacity_for(WIDTH, HEIGHT) as usize;

    let result = store.create("big", &vec![0u8; capacity + 1]);

    assert!(matches!(result, Err(StegError::InsufficientSpace { .. })));
    assert_eq!(store.file_count(), 0);
}

#[test]
fn test_payload_fills_space_exactly() {
    let (_temp, mut store) = setup_temp_store();
    let capacity = capacity_for(WIDTH, HEIGHT) as usize;

    let entry = store.create("big", &vec![9u8; capacity]).unwrap();

    assert_eq!(entry.end(), store.container().data_end());
    assert_eq!(store.usage().free_bytes, 0);
    assert!(matches!(
        store.create("more", b"x"),
        Err(StegError::InsufficientSpace { available: 0, .. })
    ));
}

#[test]
fn test_create_does_not_grow_container() {
    let (_temp, path) = setup_temp_carrier();
    let len_before = std::fs::metadata(&path).unwrap().len();

    let mut store = Store::open(&path).unwrap();
    store.create("a", &[1u8; 1000]).unwrap();
    store.close().unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), len_before);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_read_only_rejects_mutation() {
    let (_temp, path) = setup_temp_carrier();
    {
        let mut store = Store::open(&path).unwrap();
        store.create("a", b"data").unwrap();
        store.close().unwrap();
    }

    let config = StoreConfig::builder().read_only(true).build();
    let mut store = Store::open_with(&path, config).unwrap();
    assert!(store.config().read_only);

    assert!(matches!(store.create("b", b"x"), Err(StegError::ReadOnly)));
    assert!(matches!(store.delete("a"), Err(StegError::ReadOnly)));
    assert_eq!(&store.read("a").unwrap()[..], b"data");
    store.close().unwrap();
}

#[test]
fn test_max_read_size() {
    let (_temp, path) = setup_temp_carrier();
    let config = StoreConfig::builder().max_read_size(4).build();
    let mut store = Store::open_with(&path, config).unwrap();
    assert_eq!(store.config().max_read_size, 4);
    store.create("small", b"abcd").unwrap();
    store.create("large", b"abcde").unwrap();

    assert_eq!(&store.read("small").unwrap()[..], b"abcd");
    assert!(matches!(
        store.read("large"),
        Err(StegError::OutOfMemory { requested: 5 })
    ));

    // Streaming is not bounded by the buffer cap
    let mut out = Vec::new();
    store.read_into("large", &mut out).unwrap();
    assert_eq!(out, b"abcde");
}

#[test]
fn test_zero_max_read_size_rejected() {
    let (_temp, path) = setup_temp_carrier();
    let config = StoreConfig::builder().max_read_size(0).build();

    let result = Store::open_with(&path, config);

    assert!(matches!(result, Err(StegError::Config(_))));
}

#[test]
fn test_data_only_sync_mode() {
    let (_temp, path) = setup_temp_carrier();
    let config = StoreConfig::builder().sync_mode(SyncMode::DataOnly).build();

    let mut store = Store::open_with(&path, config).unwrap();
    assert_eq!(store.config().sync_mode, SyncMode::DataOnly);
    store.create("a", b"synced").unwrap();
    store.close().unwrap();

    let mut store = Store::open(&path).unwrap();
    assert_eq!(&store.read("a").unwrap()[..], b"synced");
}

#[test]
fn test_open_missing_container() {
    let temp_dir = TempDir::new().unwrap();

    let result = Store::open(temp_dir.path().join("missing.bmp"));

    assert!(matches!(result, Err(StegError::ContainerNotFound(_))));
}
