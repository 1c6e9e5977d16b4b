//! Re-encoding an archive's entries into a different container format.
//!
//! The repack keeps the original recoverable until the new container is
//! complete: when source and destination share a name the source is
//! stashed under a random suffix first, and any failure rolls the
//! filesystem back before returning.

use std::fs;
use std::path::Path;

use rom_stash_core::StashError;

use crate::registry;
use crate::util::staging_path;

/// Repack `file` into the container format named by `target_type`.
///
/// Returns true on success, false when the copy failed and was rolled
/// back. Structural problems (unknown provider, read-only target, an
/// already existing destination) are errors. `dryrun` performs the
/// resolution and destination checks without touching the filesystem.
pub fn repack(file: &Path, target_type: &str, dryrun: bool) -> Result<bool, StashError> {
    // Resolve both providers before any rename so a bad target format
    // cannot strand the source under a stash name.
    let source_provider = registry::require_provider(file)?;
    let target_provider = registry::for_extension(target_type)
        .ok_or_else(|| StashError::ArchiverNotFound(file.with_extension(target_type)))?;
    if !target_provider.write_enabled() {
        return Err(StashError::not_supported(format!(
            "{} provider cannot write archives",
            target_provider.name()
        )));
    }

    let dst = file.with_extension(target_type);
    let in_place = dst == file;
    if !in_place && dst.exists() {
        return Err(StashError::processing(format!(
            "{} already exists",
            dst.display()
        )));
    }

    if dryrun {
        return Ok(true);
    }

    let source = if in_place {
        let stash = staging_path(file, "repack");
        fs::rename(file, &stash)?;
        stash
    } else {
        file.to_path_buf()
    };

    let result = (|| -> Result<(), StashError> {
        for entry in source_provider.list(&source)? {
            rom_stash_core::cancel::check_cancelled()?;
            let mut reader = source_provider.read(&source, &entry)?;
            target_provider.write(&dst, &entry, &mut reader)?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            fs::remove_file(&source)?;
            Ok(true)
        }
        Err(err) => {
            log::warn!("repack of {} failed: {err}", file.display());
            if dst.exists() {
                let _ = fs::remove_file(&dst);
            }
            if in_place {
                fs::rename(&source, file)?;
            }
            if matches!(err, StashError::Cancelled) {
                return Err(err);
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
#[path = "tests/repack_tests.rs"]
mod tests;
