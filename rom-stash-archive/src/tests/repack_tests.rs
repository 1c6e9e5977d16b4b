use super::*;
use crate::provider::ArchiveProvider;
use crate::zip::ZipProvider;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Write-limited provider: behaves like zip but fails after N writes.
#[derive(Debug)]
struct FailingProvider {
    extension: &'static str,
    writes_allowed: usize,
    writes: AtomicUsize,
}

impl ArchiveProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }
    fn extensions(&self) -> &[&str] {
        std::slice::from_ref(&self.extension)
    }
    fn mimetypes(&self) -> &[&str] {
        &[]
    }
    fn write_enabled(&self) -> bool {
        true
    }
    fn list(&self, file: &std::path::Path) -> Result<Vec<String>, StashError> {
        ZipProvider.list(file)
    }
    fn read(&self, file: &std::path::Path, entry: &str) -> Result<Box<dyn Read>, StashError> {
        ZipProvider.read(file, entry)
    }
    fn write(
        &self,
        file: &std::path::Path,
        entry: &str,
        data: &mut dyn Read,
    ) -> Result<(), StashError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) >= self.writes_allowed {
            return Err(StashError::processing("simulated write failure"));
        }
        ZipProvider.write(file, entry, data)
    }
}

fn make_zip(dir: &TempDir, name: &str, entries: &[(&str, &[u8])]) -> std::path::PathBuf {
    let file = dir.path().join(name);
    for (entry, data) in entries {
        ZipProvider
            .write(&file, entry, &mut Cursor::new(data.to_vec()))
            .unwrap();
    }
    file
}

#[test]
fn dryrun_plans_without_touching_the_filesystem() {
    let dir = TempDir::new().unwrap();
    let file = make_zip(&dir, "foo.zip", &[("a", b"1"), ("b", b"2")]);
    let before = std::fs::read(&file).unwrap();

    // The target extension resolves to the zip provider so planning works
    // even without a real second format on the machine.
    crate::registry::register(Arc::new(FailingProvider {
        extension: "okz",
        writes_allowed: usize::MAX,
        writes: AtomicUsize::new(0),
    }));

    assert!(repack(&file, "okz", true).unwrap());
    assert_eq!(std::fs::read(&file).unwrap(), before);
    assert!(!dir.path().join("foo.okz").exists());
}

#[test]
fn repack_into_new_format() {
    let dir = TempDir::new().unwrap();
    let file = make_zip(&dir, "foo.zip", &[("a.bin", b"alpha"), ("b.bin", b"beta")]);

    crate::registry::register(Arc::new(FailingProvider {
        extension: "okz2",
        writes_allowed: usize::MAX,
        writes: AtomicUsize::new(0),
    }));

    assert!(repack(&file, "okz2", false).unwrap());
    // The source is consumed and the destination carries both entries.
    let dst = dir.path().join("foo.okz2");
    assert!(dst.exists());
    assert!(!file.exists());
    assert_eq!(
        ZipProvider.list(&dst).unwrap(),
        vec!["a.bin", "b.bin"]
    );
}

#[test]
fn failed_repack_rolls_back() {
    let dir = TempDir::new().unwrap();
    let file = make_zip(&dir, "bar.zip", &[("a.bin", b"alpha"), ("b.bin", b"beta")]);
    let before = std::fs::read(&file).unwrap();

    crate::registry::register(Arc::new(FailingProvider {
        extension: "flz",
        writes_allowed: 1,
        writes: AtomicUsize::new(0),
    }));

    assert!(!repack(&file, "flz", false).unwrap());
    assert_eq!(std::fs::read(&file).unwrap(), before);
    assert!(!dir.path().join("bar.flz").exists());
    // No stash leftovers either.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n != "bar.zip")
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[test]
fn existing_destination_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = make_zip(&dir, "baz.zip", &[("a", b"1")]);

    crate::registry::register(Arc::new(FailingProvider {
        extension: "okz3",
        writes_allowed: usize::MAX,
        writes: AtomicUsize::new(0),
    }));
    std::fs::write(dir.path().join("baz.okz3"), b"occupied").unwrap();

    assert!(repack(&file, "okz3", false).is_err());
    assert!(file.exists());
}

#[test]
fn in_place_repack_goes_through_a_stash() {
    let dir = TempDir::new().unwrap();
    let file = make_zip(&dir, "same.zip", &[("a.bin", b"alpha")]);

    // Same extension: source must be stashed, rebuilt, and the stash gone.
    assert!(repack(&file, "zip", false).unwrap());
    assert!(file.exists());
    assert_eq!(ZipProvider.list(&file).unwrap(), vec!["a.bin"]);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n != "same.zip")
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
}

#[test]
fn unknown_target_format_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = make_zip(&dir, "foo2.zip", &[("a", b"1")]);
    assert!(matches!(
        repack(&file, "rar", false),
        Err(StashError::ArchiverNotFound(_))
    ));
    assert!(file.exists());
}
