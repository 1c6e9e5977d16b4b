//! The provider contract every container format implements.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use rom_stash_core::StashError;

use crate::util::staging_path;

/// A pluggable archive back-end.
///
/// Providers expose their capabilities as data: `write_enabled` reports
/// whether the provider can add entries, and the default `delete`/`rename`
/// implementations emulate the operations through list/read/write with a
/// staging file when a format has no native support.
pub trait ArchiveProvider: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Extensions this provider claims, lowercase, without the leading dot.
    fn extensions(&self) -> &[&str];

    fn mimetypes(&self) -> &[&str];

    /// Whether `write` is available. Read-only providers return false.
    fn write_enabled(&self) -> bool;

    /// Entry names in archive order. Directory rows are never reported.
    fn list(&self, file: &Path) -> Result<Vec<String>, StashError>;

    /// Open a read stream on one entry.
    fn read(&self, file: &Path, entry: &str) -> Result<Box<dyn Read>, StashError>;

    /// Append one entry, creating the archive when missing.
    fn write(&self, file: &Path, entry: &str, data: &mut dyn Read) -> Result<(), StashError>;

    /// Remove one entry.
    ///
    /// The default emulation copies the archive without the entry to
    /// `<file>.delete-<random>` and atomically renames it over the
    /// original; the staging file is unlinked on failure.
    fn delete(&self, file: &Path, entry: &str) -> Result<(), StashError> {
        emulated_delete(self, file, entry)
    }

    /// Rename one entry. Default is copy-then-delete.
    fn rename(&self, file: &Path, from: &str, to: &str) -> Result<(), StashError> {
        emulated_rename(self, file, from, to)
    }
}

/// Delete emulation: copy the archive sans one entry to a staging file and
/// rename it over the original. The staging file is removed on failure;
/// an archive emptied by the copy removes the original outright.
pub fn emulated_delete<P: ArchiveProvider + ?Sized>(
    provider: &P,
    file: &Path,
    entry: &str,
) -> Result<(), StashError> {
    if !provider.write_enabled() {
        return Err(StashError::not_supported(format!(
            "{} provider cannot delete entries",
            provider.name()
        )));
    }
    let staging = staging_path(file, "delete");
    let result = (|| -> Result<(), StashError> {
        for name in provider.list(file)? {
            if name == entry {
                continue;
            }
            let mut reader = provider.read(file, &name)?;
            provider.write(&staging, &name, &mut reader)?;
        }
        if staging.exists() {
            fs::rename(&staging, file)?;
        } else {
            fs::remove_file(file)?;
        }
        Ok(())
    })();
    if result.is_err() && staging.exists() {
        let _ = fs::remove_file(&staging);
    }
    result
}

/// Rename emulation: copy the entry under its new name, then delete the
/// old one.
pub fn emulated_rename<P: ArchiveProvider + ?Sized>(
    provider: &P,
    file: &Path,
    from: &str,
    to: &str,
) -> Result<(), StashError> {
    let mut reader = provider.read(file, from)?;
    provider.write(file, to, &mut reader)?;
    provider.delete(file, from)
}
