//! Per-ROM validation of a vault against a catalog.

use std::collections::HashSet;

use rom_stash_archive::registry;
use rom_stash_dat::{Dat, Game};
use rom_stash_core::Rom;
use rom_stash_vault::Vault;

/// Progress events for UI consumers, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateEvent {
    GameStart {
        game: String,
    },
    RomStart {
        game: String,
        rom: String,
    },
    RomEnd {
        game: String,
        rom: String,
        error: Option<String>,
    },
    GameEnd {
        game: String,
        errors: usize,
        count: usize,
    },
}

/// Aggregate counts per validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateStats {
    pub validated: usize,
    pub not_found: usize,
    pub missing_duplicate: usize,
    pub name_mismatch: usize,
    pub wrong_place: usize,
}

impl ValidateStats {
    pub fn error_total(&self) -> usize {
        self.not_found + self.missing_duplicate + self.name_mismatch + self.wrong_place
    }

    pub fn is_clean(&self) -> bool {
        self.error_total() == 0
    }
}

/// Validate every cataloged ROM against the vault.
///
/// `roots` lists the root ROM directory names the caller considers valid
/// storage locations; the core cannot derive them from the vault.
pub fn validate(
    vault: &Vault,
    dat: &Dat,
    roots: &[String],
    progress: &mut dyn FnMut(ValidateEvent),
) -> ValidateStats {
    let mut stats = ValidateStats::default();

    // Every cataloged ROM basename, for the duplicate-name check.
    let catalog_names: HashSet<String> = dat
        .roms()
        .map(|rom| rom.path().basename())
        .collect();

    for game in dat.games() {
        if rom_stash_core::cancel::cancelled() {
            break;
        }
        progress(ValidateEvent::GameStart {
            game: game.name.clone(),
        });
        let mut errors = 0usize;

        for rom in &game.roms {
            let rom_name = rom.path().basename();
            progress(ValidateEvent::RomStart {
                game: game.name.clone(),
                rom: rom_name.clone(),
            });

            let error = validate_rom(vault, rom, game, roots, &catalog_names, &mut stats);
            if error.is_some() {
                errors += 1;
            }
            progress(ValidateEvent::RomEnd {
                game: game.name.clone(),
                rom: rom_name,
                error,
            });
        }

        progress(ValidateEvent::GameEnd {
            game: game.name.clone(),
            errors,
            count: game.roms.len(),
        });
    }

    stats
}

fn validate_rom(
    vault: &Vault,
    rom: &Rom,
    game: &Game,
    roots: &[String],
    catalog_names: &HashSet<String>,
    stats: &mut ValidateStats,
) -> Option<String> {
    let rom_name = rom.path().basename();

    let Some(matches) = vault.match_rom(rom) else {
        stats.not_found += 1;
        return Some("not found".to_string());
    };

    let named: Vec<&&Rom> = matches
        .iter()
        .filter(|m| m.path().basename() == rom_name)
        .collect();

    if named.is_empty() {
        // The content exists under other names. When each of those names
        // is itself cataloged, this entry is just a missing duplicate of
        // content already accounted for.
        let all_cataloged = matches
            .iter()
            .all(|m| catalog_names.contains(&m.path().basename()));
        if all_cataloged {
            stats.missing_duplicate += 1;
            return Some("missing duplicate".to_string());
        }
        stats.name_mismatch += 1;
        let error = if matches.len() == 1 {
            format!("name mismatch ({})", matches[0].path().basename())
        } else {
            "name mismatch".to_string()
        };
        return Some(error);
    }

    let in_place = named
        .iter()
        .any(|m| is_in_place(m, &game.name, roots));
    if !in_place {
        stats.wrong_place += 1;
        return Some("wrong place".to_string());
    }

    stats.validated += 1;
    None
}

/// Whether a vault match sits where the catalog expects it: inside a
/// storage named after the game (directory or per-game archive), or in
/// one of the declared root ROM directories.
fn is_in_place(rom: &Rom, game_name: &str, roots: &[String]) -> bool {
    let Some(storage) = rom.path().storage() else {
        return false;
    };
    let Some(basename) = storage.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        // Scanning the filesystem root; treat like a root directory.
        return roots.iter().any(|r| r == "/" || r.is_empty());
    };

    let stripped = strip_archive_extension(&basename);
    stripped == game_name || roots.iter().any(|r| r == &stripped || r == &basename)
}

/// Drop a registered archive extension from a file name.
fn strip_archive_extension(name: &str) -> String {
    for ext in registry::registered_extensions() {
        let suffix = format!(".{ext}");
        let Some(cut) = name.len().checked_sub(suffix.len()) else {
            continue;
        };
        if cut > 0
            && name
                .get(cut..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(&suffix))
        {
            return name[..cut].to_string();
        }
    }
    name.to_string()
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
