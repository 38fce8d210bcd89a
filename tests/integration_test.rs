use mpar::archive::{Archive, ArchiveOptions};
use mpar::checksum::crc32;
use mpar::{ChecksumKind, Entry, ErrorKind, ExtractOptions, MparError};
use std::fs;
use tempfile::{tempdir, NamedTempFile};

const REFERENCE_JSON: &str = r#"{"filename":"YS50eHQ=","blob":"aGVsbG8=","crcsum":"907060870"}"#;

fn v1_archive() -> Archive {
    Archive::with_options(ArchiveOptions { writer_version: 1 }).unwrap()
}

#[test]
fn test_reference_v1_archive() {
    let mut ar = v1_archive();
    ar.entries_mut().push_bytes("a.txt", "hello", false).unwrap();
    let text = ar.construct().unwrap();

    assert!(text.starts_with("MXPSQL's Portable Archive;1${\"encrypt\":[]}>"));
    assert!(text.contains(&format!("{}%{}\n", crc32(REFERENCE_JSON.as_bytes()), REFERENCE_JSON)));
    assert!(text.ends_with("@~"));

    let mut back = Archive::new();
    back.parse(&text).unwrap();
    assert_eq!(back.entries().list(), vec!["a.txt".to_string()]);
    assert_eq!(back.entries().peek("a.txt").unwrap().content, b"hello");
    assert_eq!(back.loaded_version(), 1);
}

#[test]
fn test_empty_archive_roundtrip() {
    let text = v1_archive().construct().unwrap();
    assert_eq!(text, "MXPSQL's Portable Archive;1${\"encrypt\":[]}>@~");

    let mut back = Archive::new();
    back.parse(&text).unwrap();
    assert!(back.is_empty());
}

#[test]
fn test_corrupted_json_is_checksum_mismatch() {
    let mut ar = v1_archive();
    ar.entries_mut().push_bytes("a.txt", "hello", false).unwrap();
    let text = ar.construct().unwrap();

    let pos = text.find("aGVsbG8=").unwrap();
    let mut bad = text.into_bytes();
    bad[pos] = b'b';

    let mut back = Archive::new();
    back.entries_mut().push_bytes("keep", "me", false).unwrap();
    let err = back.parse(&bad).unwrap_err();
    assert!(matches!(err, MparError::ChecksumMismatch { which: ChecksumKind::EntryRecord, .. }));
    assert_eq!(back.entries().list(), vec!["keep".to_string()]);
}

#[test]
fn test_magic_gate() {
    let mut ar = Archive::new();
    let err = ar.parse("MXPSQL's Portable Archive!;1${\"encrypt\":[]}>@~").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAnArchive);
    let err = ar.parse("PK\x03\x04 not text at all").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAnArchive);
}

#[test]
fn test_version_ceiling() {
    let text = Archive::new().construct().unwrap();
    let newer = text.replacen(
        &format!(";{}$", mpar::MPAR_VERSION),
        &format!(";{}$", mpar::MPAR_VERSION + 1),
        1,
    );
    let err = Archive::new().parse(&newer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionTooNew);
}

#[test]
fn test_v2_metadata_roundtrip() {
    let mut ar = Archive::new();
    ar.set_extra("creator", "mpar tests");
    ar.set_extra("ünïcode", "värde; with $ and > and @");
    ar.entries_mut()
        .push("bin/blob.dat", Entry::new(vec![0u8, 1, 2, 254, 255]).with_metadata("mode", "0755"), false)
        .unwrap();
    ar.entries_mut().push_bytes("empty", b"", false).unwrap();

    let text = ar.construct().unwrap();
    let mut back = Archive::new();
    back.parse(&text).unwrap();

    assert_eq!(back.loaded_version(), 2);
    assert_eq!(back.extra_metadata(), ar.extra_metadata());
    assert_eq!(back.entries(), ar.entries());
}

#[test]
fn test_file_roundtrip() {
    let tmp = NamedTempFile::new().unwrap();
    let mut ar = Archive::new();
    ar.entries_mut().push_bytes("notes.txt", "line one\nline two\n", false).unwrap();
    ar.write_to(tmp.path()).unwrap();

    let back = Archive::read_from(tmp.path()).unwrap();
    assert_eq!(back.entries(), ar.entries());
}

#[test]
fn test_read_missing_file() {
    let err = Archive::read_from("/no/such/archive.mpar").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::File);
}

#[test]
fn test_push_file_then_extract() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    let file = src.path().join("input.bin");
    fs::write(&file, [7u8; 300]).unwrap();

    let mut ar = Archive::new();
    ar.entries_mut().push_file_as("nested/dir/input.bin", &file, false).unwrap();
    ar.entries_mut().push_bytes("top.txt", "top", false).unwrap();
    ar.extract_all(dst.path()).unwrap();

    assert_eq!(fs::read(dst.path().join("nested/dir/input.bin")).unwrap(), vec![7u8; 300]);
    assert_eq!(fs::read(dst.path().join("top.txt")).unwrap(), b"top");
}

#[test]
fn test_extract_partial_then_resume() {
    let dst = tempdir().unwrap();
    let mut ar = Archive::new();
    ar.entries_mut().push_bytes("a/one.txt", "1", false).unwrap();
    ar.entries_mut().push_bytes("b/two.txt", "2", false).unwrap();

    let mut rounds = 0;
    loop {
        rounds += 1;
        match ar.extract(dst.path(), ExtractOptions::new()) {
            Ok(()) => break,
            Err(MparError::OperationPartial { missing_dir }) => fs::create_dir_all(missing_dir).unwrap(),
            Err(e) => panic!("unexpected error: {e}"),
        }
        assert!(rounds < 10);
    }
    assert_eq!(rounds, 3);
    assert_eq!(fs::read(dst.path().join("a/one.txt")).unwrap(), b"1");
    assert_eq!(fs::read(dst.path().join("b/two.txt")).unwrap(), b"2");
}

#[test]
fn test_extract_is_idempotent() {
    let dst = tempdir().unwrap();
    let mut ar = Archive::new();
    ar.entries_mut().push_bytes("d/file.bin", [1u8, 2, 3], false).unwrap();

    ar.extract_all(dst.path()).unwrap();
    let first = fs::read(dst.path().join("d/file.bin")).unwrap();
    ar.extract_all(dst.path()).unwrap();
    let second = fs::read(dst.path().join("d/file.bin")).unwrap();
    assert_eq!(first, second);
    assert_eq!(second, vec![1u8, 2, 3]);
}

#[test]
fn test_extract_rejects_escaping_names() {
    let dst = tempdir().unwrap();
    let mut ar = Archive::new();
    ar.entries_mut().push_bytes("../outside.txt", "x", false).unwrap();
    let err = ar.extract_all(dst.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_extract_rejects_absolute_names() {
    let dst = tempdir().unwrap();
    let mut ar = Archive::new();
    ar.entries_mut().push_bytes("/abs.txt", "x", false).unwrap();
    let err = ar.extract_all(dst.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(!dst.path().join("abs.txt").exists());
}

#[test]
fn test_extract_nested_dirs_one_level_at_a_time() {
    let dst = tempdir().unwrap();
    let mut ar = Archive::new();
    ar.entries_mut().push_bytes("x/y/z.txt", "deep", false).unwrap();

    let mut created = Vec::new();
    let opts = ExtractOptions::new().with_dir_creator(|d| {
        created.push(d.to_path_buf());
        fs::create_dir(d)
    });
    ar.extract(dst.path(), opts).unwrap();

    assert_eq!(created, vec![dst.path().join("x"), dst.path().join("x").join("y")]);
    assert_eq!(fs::read(dst.path().join("x/y/z.txt")).unwrap(), b"deep");
}

#[test]
fn test_parse_merges_with_overwrite() {
    let mut src = Archive::new();
    src.entries_mut().push_bytes("shared", "from archive", false).unwrap();
    let text = src.construct().unwrap();

    let mut ar = Archive::new();
    ar.entries_mut().push_bytes("shared", "local", false).unwrap();
    ar.entries_mut().push_bytes("local-only", "kept", false).unwrap();
    ar.parse(&text).unwrap();

    assert_eq!(ar.entries().peek("shared").unwrap().content, b"from archive");
    assert_eq!(ar.entries().peek("local-only").unwrap().content, b"kept");
}
