//! Checking a vault against a catalog.

use rom_stash_core::Rom;
use rom_stash_dat::Dat;
use rom_stash_vault::Vault;

/// Result of comparing a vault with a DAT.
#[derive(Debug)]
pub struct CheckReport {
    /// Cataloged ROMs with no content match in the vault
    pub missing: Vec<Rom>,
    /// Vault ROMs the catalog does not know
    pub extra: Vec<Rom>,
    /// Per game, the cataloged ROM names present in the vault
    pub included: Vec<(String, Vec<String>)>,
    /// Total number of cataloged ROMs
    pub total: usize,
}

impl CheckReport {
    /// True iff nothing is missing and nothing is extra.
    pub fn perfect(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    pub fn included_count(&self) -> usize {
        self.included.iter().map(|(_, roms)| roms.len()).sum()
    }
}

/// Compare `vault` against `dat`.
pub fn check(vault: &Vault, dat: &Dat) -> CheckReport {
    let catalog: Vault = dat.roms().cloned().collect();

    let missing = catalog.subtract(vault).roms().to_vec();
    let extra = vault.subtract(&catalog).roms().to_vec();

    let mut included = Vec::new();
    for game in dat.games() {
        let present: Vec<String> = game
            .roms
            .iter()
            .filter(|rom| vault.contains(rom))
            .map(|rom| rom.name())
            .collect();
        if !present.is_empty() {
            included.push((game.name.clone(), present));
        }
    }

    CheckReport {
        missing,
        extra,
        included,
        total: dat.rom_count(),
    }
}

#[cfg(test)]
#[path = "tests/check_tests.rs"]
mod tests;
