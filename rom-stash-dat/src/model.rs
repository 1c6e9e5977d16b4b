//! The game/ROM catalog model shared by both DAT dialects.

use std::collections::{HashMap, HashSet};

use rom_stash_core::{ChecksumKind, Rom};

use crate::error::DatError;

/// Header metadata of a DAT file.
#[derive(Debug, Clone, Default)]
pub struct DatMeta {
    pub name: String,
    pub description: String,
    pub version: String,
    pub date: String,
    pub author: String,
    pub url: String,
}

/// A per-region release of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub name: String,
    pub region: Option<String>,
}

/// A named set of ROMs representing one title.
#[derive(Debug, Clone)]
pub struct Game {
    pub name: String,
    pub cloneof: Option<String>,
    pub releases: Vec<Release>,
    pub roms: Vec<Rom>,
}

impl Game {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cloneof: None,
            releases: Vec::new(),
            roms: Vec::new(),
        }
    }
}

/// A parsed catalog: games plus a rom → containing-games reverse index.
///
/// Games own their ROMs; the reverse index holds `(game, rom)` position
/// pairs keyed by checksum value, so no owning cycle forms.
#[derive(Debug)]
pub struct Dat {
    meta: DatMeta,
    games: Vec<Game>,
    by_checksum: [HashMap<Box<[u8]>, Vec<(usize, usize)>>; 4],
}

impl Dat {
    /// Build a catalog, indexing every ROM. Two games with the same name
    /// are a content error.
    pub fn new(meta: DatMeta, games: Vec<Game>) -> Result<Self, DatError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(games.len());
        for game in &games {
            if !seen.insert(game.name.as_str()) {
                return Err(DatError::content(format!(
                    "duplicate game name {:?}",
                    game.name
                )));
            }
        }

        let mut by_checksum: [HashMap<Box<[u8]>, Vec<(usize, usize)>>; 4] = Default::default();
        for (gi, game) in games.iter().enumerate() {
            for (ri, rom) in game.roms.iter().enumerate() {
                for (slot, kind) in ChecksumKind::STRENGTH_ORDER.into_iter().enumerate() {
                    if let Some(value) = rom.checksums().get(kind) {
                        by_checksum[slot]
                            .entry(value.into())
                            .or_default()
                            .push((gi, ri));
                    }
                }
            }
        }

        Ok(Self {
            meta,
            games,
            by_checksum,
        })
    }

    pub fn meta(&self) -> &DatMeta {
        &self.meta
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, name: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.name == name)
    }

    /// All cataloged ROMs in game order.
    pub fn roms(&self) -> impl Iterator<Item = &Rom> {
        self.games.iter().flat_map(|g| g.roms.iter())
    }

    pub fn rom_count(&self) -> usize {
        self.games.iter().map(|g| g.roms.len()).sum()
    }

    /// All `(game, rom)` pairs whose content matches `rom`, strongest
    /// shared checksum kind first; the first populated bucket wins.
    pub fn matches(&self, rom: &Rom) -> Vec<(&Game, &Rom)> {
        for (slot, kind) in ChecksumKind::STRENGTH_ORDER.into_iter().enumerate() {
            let Some(value) = rom.checksums().get(kind) else {
                continue;
            };
            if let Some(hits) = self.by_checksum[slot].get(value) {
                return hits
                    .iter()
                    .map(|&(gi, ri)| (&self.games[gi], &self.games[gi].roms[ri]))
                    .collect();
            }
        }
        Vec::new()
    }

    /// The games containing a ROM with `rom`'s content.
    pub fn games_containing(&self, rom: &Rom) -> Vec<&Game> {
        let mut out: Vec<&Game> = Vec::new();
        for (game, _) in self.matches(rom) {
            if !out.iter().any(|g| g.name == game.name) {
                out.push(game);
            }
        }
        out
    }
}

/// Normalize a catalog entry name: DATs escape path separators as `\`,
/// which becomes the platform separator.
pub fn normalize_entry_name(name: &str) -> String {
    if name.contains('\\') {
        name.split('\\')
            .collect::<Vec<_>>()
            .join(std::path::MAIN_SEPARATOR_STR)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
