//! Removing vault content the catalog does not know.

use std::fs;
use std::path::Path;

use rom_stash_core::{CopyPart, StashError};
use rom_stash_dat::Dat;
use rom_stash_vault::Vault;

/// Outcome of a clean pass.
#[derive(Debug, Default)]
pub struct CleanSummary {
    /// Path strings of deleted ROMs
    pub deleted: Vec<String>,
    pub errors: Vec<String>,
}

/// Delete every vault ROM without a catalog match.
///
/// With a trash directory, each ROM is copied there (under its basename)
/// before the source is deleted. Every deletion is reported through
/// `report`; failures are collected without stopping the pass.
pub fn clean(
    vault: &mut Vault,
    dat: &Dat,
    trash_dir: Option<&Path>,
    report: &mut dyn FnMut(&str),
) -> Result<CleanSummary, StashError> {
    let mut summary = CleanSummary::default();

    if let Some(trash) = trash_dir {
        fs::create_dir_all(trash)?;
    }

    for position in 0..vault.len() {
        let is_extra = {
            let rom = &vault.roms()[position];
            !rom.path().is_virtual() && dat.matches(rom).is_empty()
        };
        if !is_extra {
            continue;
        }

        let rom = &mut vault.roms_mut()[position];
        let path_string = rom.path().to_string();

        if let Some(trash) = trash_dir {
            let target = trash.join(rom.path().basename());
            match rom.copy(&target, CopyPart::All, false, false) {
                Ok(true) => {}
                Ok(false) => {
                    summary
                        .errors
                        .push(format!("{path_string} not moved to trash, skipping"));
                    continue;
                }
                Err(e) => {
                    summary
                        .errors
                        .push(format!("cannot trash {path_string}: {e}"));
                    continue;
                }
            }
        }

        match rom.delete() {
            Ok(true) => {
                report(&path_string);
                summary.deleted.push(path_string);
            }
            Ok(false) => {}
            Err(e) => summary
                .errors
                .push(format!("cannot delete {path_string}: {e}")),
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "tests/clean_tests.rs"]
mod tests;
