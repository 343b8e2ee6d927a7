//! Integration tests for mztab
//!
//! These tests drive the public API through files on disk.

use flate2::write::GzEncoder;
use flate2::Compression;
use mztab::error::{catalog, Level};
use mztab::parser::{parse_file, parse_str, ParseOptions};
use mztab::writer::{write_file, CompressionType, WriterConfig};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

const MINIMAL: &str = include_str!("data/minimal.mztab");

/// Parse the fixture from disk
#[test]
fn test_parse_file_from_disk() {
    let outcome = parse_file("tests/data/minimal.mztab", &ParseOptions::default()).unwrap();
    assert!(outcome.fatal.is_none());
    assert!(!outcome.diagnostics.has_errors(), "{}", outcome.diagnostics);

    let mztab = outcome.file.unwrap();
    assert_eq!(mztab.metadata.mztab_id.as_deref(), Some("MTBLS263"));
    assert_eq!(mztab.metadata.ms_run.len(), 2);
    assert_eq!(mztab.metadata.assay.len(), 2);
    assert_eq!(mztab.tables().count(), 3);
    assert_eq!(mztab.small_molecule_evidence.as_ref().unwrap().rows.len(), 3);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = parse_file(dir.path().join("absent.mztab"), &ParseOptions::default());
    assert!(result.is_err());
}

/// Gzip input is detected from the magic bytes, not the extension
#[test]
fn test_gzip_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("study.txt");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(MINIMAL.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let compressed = parse_file(&path, &ParseOptions::default()).unwrap().file.unwrap();
    let plain = parse_str(MINIMAL, &ParseOptions::default()).file.unwrap();
    assert_eq!(compressed, plain);
}

#[test]
fn test_write_file_then_read_back() {
    let dir = tempdir().unwrap();
    let original = parse_str(MINIMAL, &ParseOptions::default()).file.unwrap();

    for name in ["out.mztab", "out.mztab.gz"] {
        let path = dir.path().join(name);
        let config = WriterConfig {
            compression: CompressionType::for_path(&path),
            ..Default::default()
        };
        let stats = write_file(&original, &path, &config).unwrap();
        assert_eq!(stats.rows_written, 8);

        let reread = parse_file(&path, &ParseOptions::default()).unwrap();
        assert!(reread.diagnostics.is_empty(), "{}", reread.diagnostics);
        assert_eq!(reread.file.unwrap(), original);
    }

    let gz = fs::read(dir.path().join("out.mztab.gz")).unwrap();
    assert_eq!(&gz[..2], &[0x1f, 0x8b]);
}

/// One dangling id yields exactly one diagnostic and no file
#[test]
fn test_dangling_reference() {
    let text = MINIMAL.replace("SML\t2\t3\t", "SML\t2\t3|9\t");
    let outcome = parse_str(&text, &ParseOptions::default());
    let unknown: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code() == catalog::UNKNOWN_REF_ID.code)
        .collect();
    assert_eq!(unknown.len(), 1);
    assert!(unknown[0].message().contains('9'));
    assert!(outcome.file.is_none());
}

#[test]
fn test_consistent_references_have_no_unknown_ids() {
    let outcome = parse_str(MINIMAL, &ParseOptions::new(Level::Info, 300));
    assert!(outcome
        .diagnostics
        .iter()
        .all(|d| d.code() != catalog::UNKNOWN_REF_ID.code));
}

#[test]
fn test_hash_without_method_produces_no_file() {
    let text: String = MINIMAL
        .lines()
        .filter(|l| !l.contains("ms_run[1]-hash_method"))
        .map(|l| format!("{}\n", l))
        .collect();
    let outcome = parse_str(&text, &ParseOptions::default());
    assert!(outcome.file.is_none());
    assert_eq!(
        outcome.fatal.map(|d| d.code()),
        Some(catalog::HASH_METHOD_NOT_DEFINED.code)
    );
}
