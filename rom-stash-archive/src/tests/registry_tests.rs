use super::*;
use std::io::Cursor;
use tempfile::TempDir;

#[derive(Debug)]
struct FakeProvider {
    name: &'static str,
    extensions: &'static [&'static str],
}

impl ArchiveProvider for FakeProvider {
    fn name(&self) -> &str {
        self.name
    }
    fn extensions(&self) -> &[&str] {
        self.extensions
    }
    fn mimetypes(&self) -> &[&str] {
        &[]
    }
    fn write_enabled(&self) -> bool {
        false
    }
    fn list(&self, _file: &Path) -> Result<Vec<String>, StashError> {
        Ok(Vec::new())
    }
    fn read(&self, _file: &Path, entry: &str) -> Result<Box<dyn Read>, StashError> {
        Err(StashError::processing(format!("no entry {entry}")))
    }
    fn write(&self, _file: &Path, _entry: &str, _data: &mut dyn Read) -> Result<(), StashError> {
        Err(StashError::not_supported("read-only"))
    }
}

#[test]
fn defaults_include_zip() {
    let registry = Registry::with_defaults();
    assert!(registry.for_extension("zip").is_some());
    assert!(registry.for_extension("ZIP").is_some());
    assert!(registry.for_extension("rar").is_none());
}

#[test]
fn extension_match_requires_a_stem() {
    let registry = Registry::with_defaults();
    assert!(registry.has_archive_extension(Path::new("game.zip")));
    assert!(registry.has_archive_extension(Path::new("dir/game.ZIP")));
    assert!(!registry.has_archive_extension(Path::new(".zip")));
    assert!(!registry.has_archive_extension(Path::new("game.bin")));
}

#[test]
fn longest_suffix_wins() {
    let mut registry = Registry::new();
    registry.register(Arc::new(FakeProvider {
        name: "zst",
        extensions: &["zst"],
    }));
    registry.register(Arc::new(FakeProvider {
        name: "tarzst",
        extensions: &["tar.zst"],
    }));

    let provider = registry.for_path(Path::new("bundle.tar.zst")).unwrap();
    assert_eq!(provider.name(), "tarzst");

    let provider = registry.for_path(Path::new("single.zst")).unwrap();
    assert_eq!(provider.name(), "zst");
}

#[test]
fn later_registration_overrides() {
    let mut registry = Registry::new();
    registry.register(Arc::new(FakeProvider {
        name: "first",
        extensions: &["arc"],
    }));
    registry.register(Arc::new(FakeProvider {
        name: "second",
        extensions: &["arc"],
    }));
    assert_eq!(registry.for_extension("arc").unwrap().name(), "second");
}

#[test]
fn sniffs_zip_content_without_extension() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("mystery");
    ZipProvider
        .write(&file, "a.bin", &mut Cursor::new(b"x".to_vec()))
        .unwrap();

    let registry = Registry::with_defaults();
    let provider = registry.for_path(&file).unwrap();
    assert_eq!(provider.name(), "zip");
}

#[test]
fn unknown_content_resolves_to_none() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain.bin");
    std::fs::write(&file, b"not an archive").unwrap();

    let registry = Registry::with_defaults();
    assert!(registry.for_path(&file).is_none());
}

#[test]
fn extensions_listed_longest_first() {
    let mut registry = Registry::new();
    registry.register(Arc::new(FakeProvider {
        name: "a",
        extensions: &["zip", "tar.zst", "7z"],
    }));
    assert_eq!(registry.extensions(), vec!["tar.zst", "zip", "7z"]);
}
