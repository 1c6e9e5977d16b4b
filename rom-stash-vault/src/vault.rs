//! The vault: an insertion-ordered, content-indexed ROM collection.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::ops::{BitAnd, Sub};
use std::path::Path;

use rom_stash_core::checksum::encode_hex;
use rom_stash_core::{ChecksumKind, ChecksumSet, CopyPart, Rom, StashError};

use crate::index::IndexEntry;

/// How [`Vault::copy_to`] groups target files into subdirectories.
pub enum Grouping {
    /// Everything directly under the target directory
    Flat,
    /// Group by the first `n` hex characters of the naming checksum
    Prefix(usize),
    /// Caller-supplied grouping; `None` places the ROM at the top level
    With(Box<dyn Fn(&Rom) -> Option<String>>),
}

/// Outcome of a [`Vault::copy_to`] pass.
#[derive(Debug, Default)]
pub struct CopySummary {
    pub copied: usize,
    /// Path strings that were skipped (existing targets, no storage, no
    /// naming checksum)
    pub skipped: Vec<String>,
}

/// A content-indexed multi-map of ROM descriptors.
///
/// Insertion order is preserved and determines iteration order. Four
/// inverted indexes, one per checksum kind, map checksum values to the
/// positions of the ROMs carrying them; re-inserting the same path with
/// the same content keeps the first occurrence.
#[derive(Debug, Default)]
pub struct Vault {
    roms: Vec<Rom>,
    by_checksum: [HashMap<Box<[u8]>, Vec<usize>>; 4],
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.roms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roms.is_empty()
    }

    pub fn roms(&self) -> &[Rom] {
        &self.roms
    }

    pub fn roms_mut(&mut self) -> &mut [Rom] {
        &mut self.roms
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rom> {
        self.roms.iter()
    }

    /// Append a ROM and index its checksums.
    pub fn push(&mut self, rom: Rom) {
        let position = self.roms.len();
        for (slot, kind) in ChecksumKind::STRENGTH_ORDER.into_iter().enumerate() {
            let Some(value) = rom.checksums().get(kind) else {
                continue;
            };
            let bucket = self.by_checksum[slot].entry(value.into()).or_default();
            // Same checksum at the same path: the first insertion wins.
            let duplicate_path = bucket
                .iter()
                .any(|&i| self.roms[i].path().same_location(rom.path()));
            if !duplicate_path {
                bucket.push(position);
            }
        }
        self.roms.push(rom);
    }

    /// All stored ROMs matching the query's checksums.
    ///
    /// Kinds are tried strongest first; the first populated bucket is
    /// returned whole. `None` when no defined kind hits.
    pub fn match_checksums(&self, query: &ChecksumSet) -> Option<Vec<&Rom>> {
        self.match_positions(query)
            .map(|hits| hits.iter().map(|&i| &self.roms[i]).collect())
    }

    /// [`Self::match_checksums`] over a ROM's checksum set.
    pub fn match_rom(&self, rom: &Rom) -> Option<Vec<&Rom>> {
        self.match_checksums(rom.checksums())
    }

    pub(crate) fn match_positions(&self, query: &ChecksumSet) -> Option<&[usize]> {
        for (slot, kind) in ChecksumKind::STRENGTH_ORDER.into_iter().enumerate() {
            let Some(value) = query.get(kind) else {
                continue;
            };
            if let Some(hits) = self.by_checksum[slot].get(value) {
                return Some(hits);
            }
        }
        None
    }

    /// True when any stored ROM matches the query ROM.
    pub fn contains(&self, rom: &Rom) -> bool {
        self.match_rom(rom).is_some()
    }

    /// ROMs of `self` that also match in `other`, in `self`'s order.
    pub fn intersect(&self, other: &Vault) -> Vault {
        let mut out = Vault::new();
        for rom in &self.roms {
            if other.contains(rom) {
                out.push(rom.clone());
            }
        }
        out
    }

    /// ROMs of `self` with no match in `other`, in `self`'s order.
    pub fn subtract(&self, other: &Vault) -> Vault {
        let mut out = Vault::new();
        for rom in &self.roms {
            if !other.contains(rom) {
                out.push(rom.clone());
            }
        }
        out
    }

    /// Copy every stored ROM into `dir` under its content-addressed name.
    ///
    /// The file name is the naming checksum (SHA-1) in hex; `grouping`
    /// selects an optional subdirectory level. `pristine` wipes `dir`
    /// first; existing targets are skipped unless `force`. ROMs without
    /// physical storage, or without the naming checksum, are skipped.
    pub fn copy_to(
        &self,
        dir: &Path,
        part: CopyPart,
        grouping: &Grouping,
        pristine: bool,
        force: bool,
    ) -> Result<CopySummary, StashError> {
        if pristine && dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;

        let mut summary = CopySummary::default();
        for rom in &self.roms {
            if rom.path().is_virtual() {
                summary.skipped.push(rom.path().to_string());
                continue;
            }
            let Some(name) = rom
                .checksums()
                .get(ChecksumKind::FILE_NAMING)
                .map(encode_hex)
            else {
                log::warn!("{} has no naming checksum, skipping", rom.path());
                summary.skipped.push(rom.path().to_string());
                continue;
            };

            let subdir = match grouping {
                Grouping::Flat => None,
                Grouping::Prefix(n) => Some(name[..(*n).min(name.len())].to_string()),
                Grouping::With(group) => group(rom),
            };
            let target_dir = match subdir {
                Some(sub) => dir.join(sub),
                None => dir.to_path_buf(),
            };
            fs::create_dir_all(&target_dir)?;
            let target = target_dir.join(&name);

            if target.exists() && !force {
                summary.skipped.push(rom.path().to_string());
                continue;
            }
            if rom.copy(&target, part, force, true)? {
                summary.copied += 1;
            } else {
                summary.skipped.push(rom.path().to_string());
            }
        }
        Ok(summary)
    }

    /// Snapshot the vault as `path string → index entry` with current
    /// storage mtimes. Storage-less ROMs are left out.
    pub fn index(&self) -> BTreeMap<String, IndexEntry> {
        let mut index = BTreeMap::new();
        for rom in &self.roms {
            let Some(mtime) = rom.path().mtime() else {
                continue;
            };
            index.insert(rom.path().to_string(), IndexEntry::new(rom, mtime));
        }
        index
    }
}

impl BitAnd for &Vault {
    type Output = Vault;

    fn bitand(self, other: &Vault) -> Vault {
        self.intersect(other)
    }
}

impl Sub for &Vault {
    type Output = Vault;

    fn sub(self, other: &Vault) -> Vault {
        self.subtract(other)
    }
}

impl FromIterator<Rom> for Vault {
    fn from_iter<I: IntoIterator<Item = Rom>>(iter: I) -> Self {
        let mut vault = Vault::new();
        for rom in iter {
            vault.push(rom);
        }
        vault
    }
}

#[cfg(test)]
#[path = "tests/vault_tests.rs"]
mod tests;
