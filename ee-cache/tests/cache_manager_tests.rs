//! End-to-end tests over synthetic TOC/blob pairs on disk.

use std::fs;
use std::path::{Path, PathBuf};

use ee_cache::{CacheError, CacheManager, ContentKey, Locale, Variant};
use ee_toc::{ENTRY_LENGTH, NAME_LENGTH, TOC_MAGIC, TOC_VERSION};
use pretty_assertions::assert_eq;

fn record(
    offset: i64,
    time: i64,
    compressed_size: i32,
    size: i32,
    parent: i32,
    name: &str,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(ENTRY_LENGTH);
    data.extend_from_slice(&offset.to_le_bytes());
    data.extend_from_slice(&time.to_le_bytes());
    data.extend_from_slice(&compressed_size.to_le_bytes());
    data.extend_from_slice(&size.to_le_bytes());
    data.extend_from_slice(&0i32.to_le_bytes()); // flags
    data.extend_from_slice(&parent.to_le_bytes());

    let mut raw_name = [0u8; NAME_LENGTH];
    raw_name[..name.len()].copy_from_slice(name.as_bytes());
    data.extend_from_slice(&raw_name);
    data
}

fn directory(parent: i32, name: &str) -> Vec<u8> {
    record(-1, 0, 0, 0, parent, name)
}

fn write_table(
    dir: &Path,
    stem: &str,
    records: &[Vec<u8>],
    blob: &[u8],
) -> PathBuf {
    let mut toc = Vec::new();
    toc.extend_from_slice(&TOC_MAGIC.to_le_bytes());
    toc.extend_from_slice(&TOC_VERSION.to_le_bytes());
    for r in records {
        toc.extend_from_slice(r);
    }

    let toc_path = dir.join(format!("{stem}.toc"));
    fs::write(&toc_path, toc).unwrap();
    fs::write(dir.join(format!("{stem}.cache")), blob).unwrap();
    toc_path
}

/// A legacy frame wrapping an LZ stream.
fn legacy_frame(stream: &[u8], decompressed: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(stream.len() as u16).to_be_bytes());
    data.extend_from_slice(&decompressed.to_be_bytes());
    data.extend_from_slice(stream);
    data
}

#[test]
fn raw_entry_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let toc = write_table(
        dir.path(),
        "H.Misc",
        &[
            directory(0, "Assets"),
            record(0, 1, 4, 4, 1, "X.bin"),
        ],
        &[1, 2, 3, 4],
    );

    let mut manager = CacheManager::new();
    manager.load_table(&toc).unwrap();
    assert_eq!(manager.len(), 1);

    let key = ContentKey::new(Variant::Header, Locale::Global, "/Assets/X.bin");
    let entry = manager.read_file(&key).unwrap().unwrap();
    assert_eq!(entry.data, vec![1, 2, 3, 4]);
    assert_eq!(entry.path, "/Assets/X.bin");
    assert!(!entry.entry.is_directory());
    assert_eq!(entry.entry.size, 4);
}

#[test]
fn path_lookup_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let toc = write_table(
        dir.path(),
        "H.Misc",
        &[directory(0, "Assets"), record(0, 1, 4, 4, 1, "X.bin")],
        &[1, 2, 3, 4],
    );

    let mut manager = CacheManager::new();
    manager.load_table(&toc).unwrap();

    let key = ContentKey::new(Variant::Header, Locale::Global, "/assets/x.bin");
    let entry = manager.read_file(&key).unwrap().unwrap();
    assert_eq!(entry.data, vec![1, 2, 3, 4]);
    // The resolved entry reports the archive's casing, not the probe's.
    assert_eq!(entry.path, "/Assets/X.bin");
}

#[test]
fn legacy_compressed_entry_round_trips() {
    // Literal "ab", then a distance-1 overlap copy of 8: "ababababab".
    let stream = [0x01, b'a', b'b', 0xC0, 0x01];
    let blob = legacy_frame(&stream, 10);

    let dir = tempfile::tempdir().unwrap();
    let toc = write_table(
        dir.path(),
        "B.Misc",
        &[record(0, 1, blob.len() as i32, 10, 0, "pattern.bin")],
        &blob,
    );

    let mut manager = CacheManager::new();
    manager.load_table(&toc).unwrap();

    let key = ContentKey::new(Variant::Base, Locale::Global, "/pattern.bin");
    let entry = manager.read_file(&key).unwrap().unwrap();
    assert_eq!(entry.data, b"ababababab");
    assert!(entry.entry.is_compressed());
}

#[test]
fn header_read_falls_back_to_english() {
    let dir = tempfile::tempdir().unwrap();
    let toc = write_table(
        dir.path(),
        "H.Dialog_en",
        &[record(0, 1, 5, 5, 0, "line.txt")],
        b"hello",
    );

    let mut manager = CacheManager::new();
    manager.load_table(&toc).unwrap();

    // Nothing is registered under Global; the English table answers.
    let entry = manager
        .read_header("/line.txt", Locale::Global)
        .unwrap()
        .unwrap();
    assert_eq!(entry.locale, Locale::English);
    assert_eq!(entry.data, b"hello");

    // A German probe does not fall back.
    assert!(manager.read_header("/line.txt", Locale::German).unwrap().is_none());
}

#[test]
fn data_read_prefers_full_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let base =
        write_table(dir.path(), "B.Tex", &[record(0, 1, 4, 4, 0, "t.bin")], b"base");
    let full =
        write_table(dir.path(), "F.Tex", &[record(0, 1, 4, 4, 0, "t.bin")], b"full");

    let mut manager = CacheManager::new();
    manager.load_table(&base).unwrap();
    manager.load_table(&full).unwrap();

    let entry = manager.read_data("/t.bin", Locale::Global).unwrap().unwrap();
    assert!(entry.is_full());
    assert_eq!(entry.data, b"full");

    // With only the base table, the fallback rendition resolves.
    let mut manager = CacheManager::new();
    manager.load_table(&base).unwrap();
    let entry = manager.read_data("/t.bin", Locale::Global).unwrap().unwrap();
    assert!(!entry.is_full());
    assert_eq!(entry.data, b"base");
}

#[test]
fn data_read_falls_back_to_english_for_both_variants() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_table(
        dir.path(),
        "B.Voice_en",
        &[record(0, 1, 2, 2, 0, "v.bin")],
        b"en",
    );

    let mut manager = CacheManager::new();
    manager.load_table(&base).unwrap();

    let entry = manager.read_data("/v.bin", Locale::Global).unwrap().unwrap();
    assert_eq!(entry.locale, Locale::English);
    assert_eq!(entry.data, b"en");
}

#[test]
fn later_tables_overwrite_identical_keys() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_table(
        dir.path(),
        "H.Apples",
        &[record(0, 1, 3, 3, 0, "shared.bin")],
        b"old",
    );
    let second = write_table(
        dir.path(),
        "H.Bananas",
        &[record(0, 1, 3, 3, 0, "shared.bin")],
        b"new",
    );

    let mut manager = CacheManager::new();
    manager.load_table(&first).unwrap();
    manager.load_table(&second).unwrap();
    assert_eq!(manager.len(), 1);

    let key = ContentKey::new(Variant::Header, Locale::Global, "/shared.bin");
    let entry = manager.read_file(&key).unwrap().unwrap();
    assert_eq!(entry.data, b"new");
}

#[test]
fn failed_load_leaves_prior_tables_intact() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_table(
        dir.path(),
        "H.Good",
        &[record(0, 1, 2, 2, 0, "ok.bin")],
        b"ok",
    );

    // Valid stem, corrupt payload.
    let bad = dir.path().join("H.Bad.toc");
    fs::write(&bad, b"\xFF\xFF\xFF\xFF\x14\x00\x00\x00").unwrap();
    fs::write(dir.path().join("H.Bad.cache"), b"").unwrap();

    let mut manager = CacheManager::new();
    manager.load_table(&good).unwrap();

    let err = manager.load_table(&bad).unwrap_err();
    assert!(matches!(
        err,
        CacheError::Toc(ee_toc::Error::InvalidMagic(_))
    ));

    // Unknown locale suffixes fail before any file is touched.
    let err = manager.load_table(dir.path().join("H.Thing_qq.toc")).unwrap_err();
    assert!(matches!(err, CacheError::UnknownLocale(_)));

    let key = ContentKey::new(Variant::Header, Locale::Global, "/ok.bin");
    assert_eq!(manager.read_file(&key).unwrap().unwrap().data, b"ok");
    assert_eq!(manager.len(), 1);
}

#[test]
fn unregistered_paths_read_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let toc = write_table(
        dir.path(),
        "H.Misc",
        &[record(0, 1, 2, 2, 0, "a.bin")],
        b"aa",
    );

    let mut manager = CacheManager::new();
    manager.load_table(&toc).unwrap();

    let key = ContentKey::new(Variant::Header, Locale::Global, "/missing.bin");
    assert!(manager.read_file(&key).unwrap().is_none());
    assert!(manager.read_header("/missing.bin", Locale::Global).unwrap().is_none());
    assert!(manager.read_data("/missing.bin", Locale::Global).unwrap().is_none());
}

#[test]
fn enumeration_decompresses_every_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut blob = Vec::new();
    blob.extend_from_slice(b"first");
    blob.extend_from_slice(b"second!");
    let toc = write_table(
        dir.path(),
        "F.Bundle",
        &[
            directory(0, "Data"),
            record(0, 1, 5, 5, 1, "one.bin"),
            record(5, 1, 7, 7, 1, "two.bin"),
        ],
        &blob,
    );

    let mut manager = CacheManager::new();
    manager.load_table(&toc).unwrap();

    let mut seen: Vec<(String, Vec<u8>)> = manager
        .entries()
        .map(|entry| {
            let entry = entry.unwrap();
            (entry.path, entry.data)
        })
        .collect();
    seen.sort();

    assert_eq!(
        seen,
        vec![
            ("/Data/one.bin".to_string(), b"first".to_vec()),
            ("/Data/two.bin".to_string(), b"second!".to_vec()),
        ]
    );
}

#[test]
fn duplicate_paths_resolve_to_newest_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut blob = Vec::new();
    blob.extend_from_slice(b"old");
    blob.extend_from_slice(b"new");
    let toc = write_table(
        dir.path(),
        "H.Misc",
        &[
            record(0, 100, 3, 3, 0, "Dup.bin"),
            record(3, 200, 3, 3, 0, "dup.bin"),
        ],
        &blob,
    );

    let mut manager = CacheManager::new();
    manager.load_table(&toc).unwrap();
    assert_eq!(manager.len(), 1);

    let key = ContentKey::new(Variant::Header, Locale::Global, "/dup.bin");
    let entry = manager.read_file(&key).unwrap().unwrap();
    assert_eq!(entry.data, b"new");
    assert_eq!(entry.entry.time, 200);
}
