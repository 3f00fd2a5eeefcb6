//! Integration tests for the manifest rebuild
//!
//! These tests lay out a raw store by hand in a temporary directory and
//! check the manifest the cataloger produces from it.

use corpus_ingest::storage::{
    append_jsonl, parse_records, read_log, sha256_hex, split_lines, ArtifactKind, ManifestRecord,
    RawLogRecord, RawStore,
};
use corpus_ingest::Cataloger;
use std::fs;
use std::io::Write;
use tempfile::TempDir;

fn log_record(kind: ArtifactKind, url: &str, path: &std::path::Path, body: &[u8]) -> RawLogRecord {
    RawLogRecord {
        kind,
        url: url.to_string(),
        path: path.to_string_lossy().into_owned(),
        sha256: sha256_hex(body),
        http_status: 200,
        content_type: match kind {
            ArtifactKind::Html => "text/html".to_string(),
            ArtifactKind::Pdf => "application/pdf".to_string(),
        },
        fetched_at: 1_700_000_000,
        depth: match kind {
            ArtifactKind::Html => Some(0),
            ArtifactKind::Pdf => None,
        },
    }
}

fn manifest(store: &RawStore) -> Vec<ManifestRecord> {
    let content = read_log(&store.manifest_path()).expect("Failed to read manifest");
    parse_records::<ManifestRecord, _>("manifest", split_lines(&content))
        .map(|(_, record)| record)
        .collect()
}

fn setup() -> (TempDir, RawStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = RawStore::under(dir.path());
    store.ensure_dirs().expect("Failed to create store dirs");
    (dir, store)
}

#[test]
fn test_identical_content_cataloged_once() {
    let (_dir, store) = setup();
    let body = b"<html>same</html>";
    fs::write(store.artifact_path(ArtifactKind::Html, "x.test_b.html"), body).unwrap();
    fs::write(store.artifact_path(ArtifactKind::Html, "x.test_a.html"), body).unwrap();
    fs::write(store.artifact_path(ArtifactKind::Pdf, "x.test_a.pdf"), body).unwrap();

    let stats = Cataloger::new(&store).rebuild().expect("Rebuild failed");

    assert_eq!(stats.files_scanned, 3);
    assert_eq!(stats.records, 1);
    assert_eq!(stats.duplicates, 2);

    let records = manifest(&store);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ArtifactKind::Html);
    assert!(records[0].path.ends_with("x.test_a.html"));
    assert_eq!(records[0].sha256, sha256_hex(body));
    assert_eq!(records[0].size_bytes, body.len() as u64);
}

#[test]
fn test_provenance_from_host_logs() {
    let (_dir, store) = setup();

    let page = store.artifact_path(ArtifactKind::Html, "x.test_help.html");
    let manual = store.artifact_path(ArtifactKind::Pdf, "x.test_help_manual.pdf");
    fs::write(&page, b"<html>help</html>").unwrap();
    fs::write(&manual, b"%PDF-1.4").unwrap();

    store
        .append_log(
            "x.test",
            &log_record(ArtifactKind::Html, "https://x.test/help/", &page, b"<html>help</html>"),
        )
        .unwrap();
    store
        .append_log(
            "x.test",
            &log_record(
                ArtifactKind::Pdf,
                "https://x.test/help/manual.pdf",
                &manual,
                b"%PDF-1.4",
            ),
        )
        .unwrap();

    let stats = Cataloger::new(&store).rebuild().expect("Rebuild failed");
    assert_eq!(stats.with_provenance, 2);

    let records = manifest(&store);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, ArtifactKind::Html);
    assert_eq!(records[0].source_url.as_deref(), Some("https://x.test/help/"));
    assert_eq!(records[0].raw_id.as_deref(), Some("x.test.jsonl:1"));
    assert_eq!(records[1].kind, ArtifactKind::Pdf);
    assert_eq!(
        records[1].source_url.as_deref(),
        Some("https://x.test/help/manual.pdf")
    );
    assert_eq!(records[1].raw_id.as_deref(), Some("x.test.jsonl:2"));
}

#[test]
fn test_recrawl_log_lines_update_provenance() {
    let (_dir, store) = setup();
    let page = store.artifact_path(ArtifactKind::Html, "x.test_help.html");
    fs::write(&page, b"<html>v1</html>").unwrap();

    for _ in 0..3 {
        store
            .append_log(
                "x.test",
                &log_record(ArtifactKind::Html, "https://x.test/help/", &page, b"<html>v1</html>"),
            )
            .unwrap();
    }

    Cataloger::new(&store).rebuild().expect("Rebuild failed");

    let records = manifest(&store);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].raw_id.as_deref(), Some("x.test.jsonl:3"));
}

#[test]
fn test_malformed_log_lines_are_skipped() {
    let (_dir, store) = setup();
    let page = store.artifact_path(ArtifactKind::Html, "y.test_docs.html");
    fs::write(&page, b"<html>docs</html>").unwrap();

    let log_path = store.host_log_path("y.test");
    let mut file = fs::File::create(&log_path).unwrap();
    writeln!(file, "not json at all").unwrap();
    writeln!(file, "{{\"truncated\": ").unwrap();
    drop(file);
    append_jsonl(
        &log_path,
        &log_record(ArtifactKind::Html, "https://y.test/docs/", &page, b"<html>docs</html>"),
    )
    .unwrap();

    Cataloger::new(&store).rebuild().expect("Rebuild failed");

    let records = manifest(&store);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].raw_id.as_deref(), Some("y.test.jsonl:3"));
}

#[test]
fn test_files_without_logs_have_no_provenance() {
    let (_dir, store) = setup();
    fs::write(store.artifact_path(ArtifactKind::Pdf, "manual.pdf"), b"%PDF").unwrap();

    Cataloger::new(&store).rebuild().expect("Rebuild failed");

    let records = manifest(&store);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_url, None);
    assert_eq!(records[0].raw_id, None);
}

#[test]
fn test_missing_directories_produce_empty_manifest() {
    let dir = TempDir::new().unwrap();
    let store = RawStore::under(&dir.path().join("never-created"));

    let stats = Cataloger::new(&store).rebuild().expect("Rebuild failed");

    assert_eq!(stats.records, 0);
    assert!(manifest(&store).is_empty());
}

#[test]
fn test_manifest_is_not_read_as_a_host_log() {
    let (_dir, store) = setup();
    fs::write(store.artifact_path(ArtifactKind::Html, "a.html"), b"<html>a</html>").unwrap();

    Cataloger::new(&store).rebuild().expect("First rebuild failed");
    Cataloger::new(&store).rebuild().expect("Second rebuild failed");

    let records = manifest(&store);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].raw_id, None);
}
