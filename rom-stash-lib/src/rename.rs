//! Renaming vault ROMs to their cataloged names.

use rom_stash_dat::Dat;
use rom_stash_vault::Vault;

/// Outcome of a rename pass.
#[derive(Debug, Default)]
pub struct RenameSummary {
    pub renamed: usize,
    /// Redundant alternative-name copies that were deleted
    pub deleted: usize,
    pub already_correct: usize,
    /// Vault ROMs the catalog does not know
    pub unmatched: usize,
    pub errors: Vec<String>,
}

#[derive(Debug)]
enum Action {
    Keep,
    Rename(String),
    Delete,
    Unmatched,
}

/// Rename every vault ROM to its cataloged name.
///
/// A ROM whose content matches one catalog entry takes that entry's name.
/// When the content is cataloged under several names, the first name not
/// yet present in the vault is used; a ROM whose name fills no catalog
/// slot and whose content is already present under every cataloged name
/// is deleted as a redundant duplicate.
pub fn rename_to_catalog(vault: &mut Vault, dat: &Dat, force: bool) -> RenameSummary {
    let mut summary = RenameSummary::default();

    for position in 0..vault.len() {
        let action = plan_action(vault, dat, position);
        match action {
            Action::Keep => summary.already_correct += 1,
            Action::Unmatched => {
                log::warn!(
                    "{} is not in the catalog, skipping",
                    vault.roms()[position].path()
                );
                summary.unmatched += 1;
            }
            Action::Rename(new_name) => {
                let rom = &mut vault.roms_mut()[position];
                match rom.rename(&new_name, force) {
                    Ok(true) => summary.renamed += 1,
                    Ok(false) => summary.errors.push(format!(
                        "target of {} already exists: {new_name}",
                        rom.path()
                    )),
                    Err(e) => summary
                        .errors
                        .push(format!("cannot rename {}: {e}", rom.path())),
                }
            }
            Action::Delete => {
                let rom = &mut vault.roms_mut()[position];
                match rom.delete() {
                    Ok(true) => summary.deleted += 1,
                    Ok(false) => {}
                    Err(e) => summary
                        .errors
                        .push(format!("cannot delete {}: {e}", rom.path())),
                }
            }
        }
    }

    summary
}

fn plan_action(vault: &Vault, dat: &Dat, position: usize) -> Action {
    let rom = &vault.roms()[position];
    if rom.path().is_virtual() {
        return Action::Keep;
    }

    let matches = dat.matches(rom);
    if matches.is_empty() {
        return Action::Unmatched;
    }

    let current = rom.name();

    if matches.len() == 1 {
        let catalog_name = matches[0].1.name();
        if catalog_name == current {
            return Action::Keep;
        }
        return Action::Rename(catalog_name);
    }

    // Several catalog entries share this content. Names the catalog wants
    // minus names the vault already holds for it are still free.
    let catalog_names: Vec<String> = matches.iter().map(|(_, r)| r.name()).collect();
    if catalog_names.contains(&current) {
        return Action::Keep;
    }

    let vault_names: Vec<String> = vault
        .match_rom(rom)
        .map(|hits| hits.iter().map(|r| r.name()).collect())
        .unwrap_or_default();
    let free = catalog_names
        .iter()
        .find(|name| !vault_names.contains(name));

    match free {
        Some(name) => Action::Rename(name.clone()),
        // Every cataloged name is already materialized elsewhere; this
        // copy only duplicates one of them under a stray name.
        None => Action::Delete,
    }
}

#[cfg(test)]
#[path = "tests/rename_tests.rs"]
mod tests;
