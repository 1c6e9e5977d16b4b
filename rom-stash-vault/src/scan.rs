//! Filesystem ingestion: plain files, directory walks and glob patterns.

use std::path::{Path, PathBuf};

use rom_stash_archive::{registry, RomArchive};
use rom_stash_core::digest::{digest_file, digest_reader};
use rom_stash_core::path::ArchiveHandle;
use rom_stash_core::{Rom, RomPath, StashError};

use crate::vault::Vault;

/// File names conventionally kept next to a ROM set, never ingested.
const ANCILLARY_FILES: &[&str] = &[".dat", ".index", ".missing", ".baddump", ".extra"];

/// Directory names conventionally holding managed state, never descended.
const ANCILLARY_DIRS: &[&str] = &[".roms", ".games", ".trash"];

impl Vault {
    /// Ingest one file: an archive contributes one ROM per entry, anything
    /// else is a single ROM.
    pub fn add_from_file(
        &mut self,
        relative: &Path,
        basedir: Option<&Path>,
    ) -> Result<(), StashError> {
        let full = match basedir {
            Some(base) => base.join(relative),
            None => relative.to_path_buf(),
        };

        if registry::is_archive_path(&full) {
            let archive = RomArchive::for_path(&full)?;
            for entry in archive.entries()? {
                let reader = archive.reader(&entry)?;
                let digest = digest_reader(reader)?;
                let path = RomPath::from_archive(archive.clone(), entry);
                self.push(Rom::from_digest(path, digest));
            }
            return Ok(());
        }

        let digest = digest_file(&full)?;
        let path = RomPath::from_file(relative, basedir.map(Path::to_path_buf))?;
        self.push(Rom::from_digest(path, digest));
        Ok(())
    }

    /// Ingest a directory tree, pre-order, with the conventional pruning:
    /// ancillary file names are skipped, dot-directories and managed
    /// subdirectories are not descended, directories carrying their own
    /// `.dat`/`.index` are whole-sale pruned, and `depth` (when set)
    /// bounds the number of path components below `dir`.
    pub fn add_from_dir(&mut self, dir: &Path, depth: Option<usize>) -> Result<(), StashError> {
        self.walk_dir(dir, Path::new(""), 0, depth)
    }

    fn walk_dir(
        &mut self,
        base: &Path,
        relative: &Path,
        level: usize,
        depth: Option<usize>,
    ) -> Result<(), StashError> {
        let current = base.join(relative);
        let mut entries: Vec<_> = std::fs::read_dir(&current)?
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            rom_stash_core::cancel::check_cancelled()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let child_relative = relative.join(&name);
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                if name.starts_with('.') || ANCILLARY_DIRS.contains(&name.as_str()) {
                    continue;
                }
                // A directory with its own catalog or index is a foreign
                // collection; leave it alone.
                if has_own_collection(&entry.path()) {
                    continue;
                }
                if depth.is_some_and(|d| level + 1 >= d) {
                    continue;
                }
                self.walk_dir(base, &child_relative, level + 1, depth)?;
            } else if file_type.is_file() {
                if ANCILLARY_FILES.contains(&name.as_str()) {
                    continue;
                }
                if depth.is_some_and(|d| level + 1 > d) {
                    continue;
                }
                self.add_from_file(&child_relative, Some(base))?;
            }
        }
        Ok(())
    }

    /// Ingest every file matching a glob pattern.
    ///
    /// The base directory is the longest literal prefix before the first
    /// glob metacharacter; matches inside it obey the same pruning rules
    /// as a directory walk.
    pub fn add_from_glob(&mut self, pattern: &str) -> Result<(), StashError> {
        let base = glob_base(pattern);

        let paths = glob::glob(pattern)
            .map_err(|e| StashError::content(format!("bad glob pattern {pattern:?}: {e}")))?;
        for path in paths {
            let path =
                path.map_err(|e| StashError::processing(format!("glob walk failed: {e}")))?;
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(&base).unwrap_or(&path);
            if is_pruned(relative) {
                continue;
            }
            self.add_from_file(relative, Some(base.as_path()))?;
        }
        Ok(())
    }
}

/// True when the directory holds its own `.dat` or `.index`.
fn has_own_collection(dir: &Path) -> bool {
    dir.join(".dat").is_file() || dir.join(".index").is_file()
}

/// Apply the walk pruning rules to a relative match from a glob.
fn is_pruned(relative: &Path) -> bool {
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        let name = component.as_os_str().to_string_lossy();
        let is_last = components.peek().is_none();
        if is_last {
            if ANCILLARY_FILES.contains(&name.as_ref()) {
                return true;
            }
        } else if name.starts_with('.') || ANCILLARY_DIRS.contains(&name.as_ref()) {
            return true;
        }
    }
    false
}

/// The longest literal prefix of a glob pattern: every path component
/// before the first one carrying an unescaped `*`, `?` or `[`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if has_glob_meta(&text) {
            break;
        }
        base.push(component);
    }
    base
}

fn has_glob_meta(component: &str) -> bool {
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' | '?' | '[' => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
#[path = "tests/scan_tests.rs"]
mod tests;
