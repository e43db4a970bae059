//! Atomic output tests.
//!
//! The writer goes through a sibling temporary file (target name plus `~`)
//! and renames it over the target, so the target path only ever holds a
//! complete document. On failure the temporary is left behind.

use pdfpress::{BuiltinFont, Error, Generator, GeneratorConfig};
use std::path::Path;

fn generator_with_page(target: &Path) -> Generator {
    let mut gen = Generator::new(target, GeneratorConfig::default());
    let font = gen.builtin_font(BuiltinFont::Helvetica);
    {
        let mut page = gen.guarded_page_context();
        page.draw_text_at("atomic", font, 12.0, 72.0, 700.0).unwrap();
    }
    gen
}

#[test]
fn test_write_creates_complete_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.pdf");

    generator_with_page(&target).write().unwrap();

    let bytes = std::fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.ends_with(b"%%EOF"));
    // The temporary is gone after a successful rename.
    assert!(!dir.path().join("out.pdf~").exists());
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.pdf");
    std::fs::write(&target, b"stale content").unwrap();

    generator_with_page(&target).write().unwrap();

    let bytes = std::fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_create_failure_reports_temp_path() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing").join("out.pdf");

    let err = generator_with_page(&target).write().unwrap_err();
    match err {
        Error::Create {
            path, ..
        } => assert_eq!(path, dir.path().join("missing").join("out.pdf~")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!target.exists());
}

#[test]
fn test_rename_failure_leaves_temp_behind() {
    let dir = tempfile::tempdir().unwrap();
    // Renaming a file over a non-empty directory fails.
    let target = dir.path().join("out.pdf");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("occupant"), b"existing bytes").unwrap();

    let err = generator_with_page(&target).write().unwrap_err();
    assert!(matches!(err, Error::Rename { .. }));

    // The temporary holds the complete document for inspection; the target
    // is byte-for-byte untouched.
    let temp = dir.path().join("out.pdf~");
    let bytes = std::fs::read(&temp).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.ends_with(b"%%EOF"));
    assert_eq!(
        std::fs::read(target.join("occupant")).unwrap(),
        b"existing bytes"
    );
}

#[test]
fn test_empty_document_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.pdf");

    let gen = Generator::new(&target, GeneratorConfig::default());
    assert!(matches!(gen.write(), Err(Error::NoPages)));
    assert!(!target.exists());
    assert!(!dir.path().join("out.pdf~").exists());
}
