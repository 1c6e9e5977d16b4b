//! An archive file bound to its provider.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use rom_stash_core::path::ArchiveHandle;
use rom_stash_core::util::{limited_copy, same_stream_contents};
use rom_stash_core::StashError;

use crate::provider::ArchiveProvider;
use crate::registry;

/// One archive file and the provider that understands it.
///
/// Shared via [`Arc`] so every ROM path inside the same archive sees the
/// same handle; all durable state lives in the file itself.
#[derive(Debug)]
pub struct RomArchive {
    path: PathBuf,
    provider: Arc<dyn ArchiveProvider>,
}

impl RomArchive {
    pub fn new(path: impl Into<PathBuf>, provider: Arc<dyn ArchiveProvider>) -> Self {
        Self {
            path: path.into(),
            provider,
        }
    }

    /// Resolve the provider from the process registry.
    pub fn for_path(path: impl Into<PathBuf>) -> Result<Arc<Self>, StashError> {
        let path = path.into();
        let provider = registry::require_provider(&path)?;
        Ok(Arc::new(Self::new(path, provider)))
    }

    pub fn provider(&self) -> &Arc<dyn ArchiveProvider> {
        &self.provider
    }

    pub fn include(&self, entry: &str) -> Result<bool, StashError> {
        Ok(self.entries()?.iter().any(|e| e == entry))
    }

    pub fn is_empty(&self) -> Result<bool, StashError> {
        Ok(self.entries()?.is_empty())
    }

    /// Visit `(entry, reader)` pairs in archive order.
    pub fn each<F>(&self, mut visit: F) -> Result<(), StashError>
    where
        F: FnMut(&str, Box<dyn Read>) -> Result<(), StashError>,
    {
        for entry in self.entries()? {
            rom_stash_core::cancel::check_cancelled()?;
            let reader = self.provider.read(&self.path, &entry)?;
            visit(&entry, reader)?;
        }
        Ok(())
    }

    /// Append one entry from a reader.
    pub fn write_entry(&self, entry: &str, data: &mut dyn Read) -> Result<(), StashError> {
        self.provider.write(&self.path, entry, data)
    }

    /// Byte-compare two entries.
    pub fn same_entries(&self, a: &str, b: &str) -> Result<bool, StashError> {
        let reader_a = self.provider.read(&self.path, a)?;
        let reader_b = self.provider.read(&self.path, b)?;
        Ok(same_stream_contents(reader_a, reader_b)?)
    }

    /// Copy entry `from` to entry `to` within the archive.
    ///
    /// An existing identical target is a no-op returning true; an existing
    /// differing target returns false unless `force` replaces it.
    pub fn copy_entry(&self, from: &str, to: &str, force: bool) -> Result<bool, StashError> {
        if self.include(to)? {
            if self.same_entries(from, to)? {
                return Ok(true);
            }
            if !force {
                return Ok(false);
            }
            self.provider.delete(&self.path, to)?;
        }
        let mut reader = self.provider.read(&self.path, from)?;
        self.provider.write(&self.path, to, &mut reader)?;
        Ok(true)
    }
}

impl ArchiveHandle for RomArchive {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn entries(&self) -> Result<Vec<String>, StashError> {
        self.provider.list(&self.path)
    }

    fn reader(&self, entry: &str) -> Result<Box<dyn Read>, StashError> {
        self.provider.read(&self.path, entry)
    }

    fn extract(
        &self,
        entry: &str,
        dst: &Path,
        len: Option<u64>,
        offset: u64,
        force: bool,
    ) -> Result<bool, StashError> {
        if dst.exists() {
            if !force {
                return Ok(false);
            }
            fs::remove_file(dst)?;
        }
        let mut reader = self.provider.read(&self.path, entry)?;
        if offset > 0 {
            // Archive streams cannot seek; discard the leading bytes.
            std::io::copy(&mut (&mut reader).take(offset), &mut std::io::sink())?;
        }
        let mut writer = fs::File::create(dst)?;
        limited_copy(&mut reader, &mut writer, len)?;
        Ok(true)
    }

    fn delete_entry(&self, entry: &str) -> Result<bool, StashError> {
        let entries = self.entries()?;
        if !entries.iter().any(|e| e == entry) {
            return Ok(false);
        }
        if entries.len() == 1 {
            // Removing the last entry removes the archive itself.
            fs::remove_file(&self.path)?;
            return Ok(true);
        }
        self.provider.delete(&self.path, entry)?;
        Ok(true)
    }

    fn rename_entry(&self, from: &str, to: &str, force: bool) -> Result<bool, StashError> {
        if from == to {
            return Ok(true);
        }
        if self.include(to)? {
            if self.same_entries(from, to)? {
                return self.delete_entry(from);
            }
            if !force {
                return Ok(false);
            }
            self.provider.delete(&self.path, to)?;
        }
        self.provider.rename(&self.path, from, to)?;
        Ok(true)
    }

    fn mtime(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

#[cfg(test)]
#[path = "tests/archive_tests.rs"]
mod tests;
