//! Rebuilding per-game archives from a vault and a catalog.

use std::fs;
use std::path::Path;

use rom_stash_archive::registry;
use rom_stash_core::{CopyPart, StashError};
use rom_stash_dat::Dat;
use rom_stash_vault::{Grouping, Vault};

/// Outcome of a rebuild pass.
#[derive(Debug, Default)]
pub struct RebuildSummary {
    pub games_built: usize,
    pub entries_written: usize,
    /// `(game, rom)` pairs with no matching content in the vault
    pub missing: Vec<(String, String)>,
}

/// Materialize `dest/<game>.<format>` archives for every game in `dat`.
///
/// All vault content is first staged content-addressed under
/// `dest/.roms`, headers stripped; each game archive is then written
/// entry by entry from the staging area, which is removed on completion.
/// Vault content the catalog does not reference is implicitly dropped.
pub fn rebuild(
    dest: &Path,
    dat: &Dat,
    vault: &Vault,
    format: &str,
) -> Result<RebuildSummary, StashError> {
    let provider = registry::for_extension(format)
        .ok_or_else(|| StashError::ArchiverNotFound(dest.join(format!("game.{format}"))))?;
    if !provider.write_enabled() {
        return Err(StashError::not_supported(format!(
            "{} provider cannot write archives",
            provider.name()
        )));
    }

    fs::create_dir_all(dest)?;
    let staging = dest.join(".roms");
    vault.copy_to(&staging, CopyPart::Rom, &Grouping::Flat, true, true)?;

    let mut staged = Vault::new();
    staged.add_from_dir(&staging, None)?;

    let result = build_games(dest, dat, &staged, format, provider.as_ref());

    // The staging area goes away on success and on failure alike.
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    result
}

fn build_games(
    dest: &Path,
    dat: &Dat,
    staged: &Vault,
    format: &str,
    provider: &dyn rom_stash_archive::ArchiveProvider,
) -> Result<RebuildSummary, StashError> {
    let mut summary = RebuildSummary::default();

    for game in dat.games() {
        let target = dest.join(format!("{}.{format}", game.name));
        let mut written = 0usize;

        for rom in &game.roms {
            let Some(hits) = staged.match_rom(rom) else {
                summary.missing.push((game.name.clone(), rom.name()));
                continue;
            };
            if written == 0 && target.exists() {
                // A leftover archive from an earlier run would accumulate
                // stale entries.
                fs::remove_file(&target)?;
            }
            let source = hits[0];
            let mut reader = source.path().reader()?;
            provider.write(&target, &rom.name(), &mut reader)?;
            written += 1;
        }

        if written > 0 {
            summary.games_built += 1;
            summary.entries_written += written;
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "tests/rebuild_tests.rs"]
mod tests;
