//! Index persistence: a serialized vault snapshot with storage mtimes.
//!
//! The on-disk shape is a mapping from path string to checksum/size/
//! timestamp records, as YAML or JSON. Loading compares recorded mtimes
//! with the filesystem and routes disagreements through an out-of-sync
//! callback; updating reconciles the index with what changed on disk.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rom_stash_archive::{registry, RomArchive};
use rom_stash_core::config::{archive_path_string, split_archive_path};
use rom_stash_core::digest::{digest_file, digest_reader};
use rom_stash_core::path::ArchiveHandle;
use rom_stash_core::{ChecksumKind, ChecksumSet, Rom, RomPath, StashError};

use crate::vault::Vault;

/// One persisted ROM record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc32: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Header length; omitted when zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub timestamp: String,
}

impl IndexEntry {
    pub fn new(rom: &Rom, mtime: SystemTime) -> Self {
        Self {
            sha256: rom.checksums().hex(ChecksumKind::Sha256),
            sha1: rom.checksums().hex(ChecksumKind::Sha1),
            md5: rom.checksums().hex(ChecksumKind::Md5),
            crc32: rom.checksums().hex(ChecksumKind::Crc32),
            size: rom.size(),
            offset: rom.offset().filter(|&o| o > 0),
            timestamp: format_timestamp(mtime),
        }
    }

    fn checksums(&self) -> Result<ChecksumSet, StashError> {
        let mut set = ChecksumSet::new();
        for (kind, value) in [
            (ChecksumKind::Sha256, &self.sha256),
            (ChecksumKind::Sha1, &self.sha1),
            (ChecksumKind::Md5, &self.md5),
            (ChecksumKind::Crc32, &self.crc32),
        ] {
            if let Some(hex) = value {
                set.insert_hex(kind, hex)
                    .map_err(|e| StashError::load(e.to_string()))?;
            }
        }
        Ok(set)
    }
}

/// Serialization format of an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Yaml,
    Json,
}

/// One reconciliation step reported by [`update_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    /// The entry's storage vanished or the entry left its archive
    Remove(String),
    /// The entry was re-digested in place
    Update(String),
    /// A new file or archive entry joined the index
    Add(String),
}

/// Timestamp format used in index files, e.g.
/// `2021-07-14 13:02:55.123456789 UTC`.
const TIMESTAMP_FORMAT: &str = "%F %T%.9f %Z";

pub(crate) fn format_timestamp(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.format(TIMESTAMP_FORMAT).to_string()
}

/// The storage's current mtime rendered like the stored timestamp, or
/// `None` when the storage is gone.
fn current_timestamp(rom: &Rom) -> Option<String> {
    rom.path().mtime().map(format_timestamp)
}

/// Serialize the vault's index to `dst`.
///
/// `pathstrip` removes that many leading path components from every key;
/// keys stripped down to nothing are handed to `skipped` and omitted.
pub fn save_index(
    vault: &Vault,
    dst: &Path,
    format: IndexFormat,
    pathstrip: usize,
    skipped: &mut dyn FnMut(&str),
) -> Result<(), StashError> {
    let mut index: BTreeMap<String, IndexEntry> = BTreeMap::new();
    for (path, entry) in vault.index() {
        match strip_path(&path, pathstrip) {
            Some(stripped) => {
                index.insert(stripped, entry);
            }
            None => skipped(&path),
        }
    }

    write_index_map(&index, dst, format)
}

fn write_index_map(
    index: &BTreeMap<String, IndexEntry>,
    dst: &Path,
    format: IndexFormat,
) -> Result<(), StashError> {
    let serialized = match format {
        IndexFormat::Yaml => serde_yml::to_string(index)
            .map_err(|e| StashError::load(format!("cannot serialize index: {e}")))?,
        IndexFormat::Json => serde_json::to_string_pretty(index)
            .map_err(|e| StashError::load(format!("cannot serialize index: {e}")))?,
    };
    std::fs::write(dst, serialized)?;
    Ok(())
}

/// A vault path string re-expressed relative to the index's directory.
fn relative_key(path_string: &str, basedir: &Path) -> String {
    if basedir.as_os_str().is_empty() {
        return path_string.to_string();
    }
    let prefix = format!("{}{}", basedir.display(), std::path::MAIN_SEPARATOR);
    path_string
        .strip_prefix(&prefix)
        .unwrap_or(path_string)
        .to_string()
}

/// Remove the first `n` path components, keeping an archive entry intact.
///
/// When the archive separator coincides with the path separator the
/// archive file is recognized by a registered extension on a component;
/// the first such component counts as the archive file.
fn strip_path(path: &str, n: usize) -> Option<String> {
    if n == 0 {
        return Some(path.to_string());
    }
    let sep = rom_stash_core::archive_separator();
    if sep == std::path::MAIN_SEPARATOR_STR {
        let components: Vec<&str> = path.split(std::path::MAIN_SEPARATOR).collect();
        let archive_at = components
            .iter()
            .position(|c| registry::is_archive_path(Path::new(c)));
        match archive_at {
            // Stripping the archive file itself strips every entry in it.
            Some(at) if n > at => None,
            _ if n >= components.len() => None,
            _ => Some(components[n..].join(std::path::MAIN_SEPARATOR_STR)),
        }
    } else if let Some((file, entry)) = split_archive_path(path) {
        let stripped = strip_components(&file, n)?;
        Some(archive_path_string(&stripped, &entry))
    } else {
        strip_components(path, n)
    }
}

fn strip_components(path: &str, n: usize) -> Option<String> {
    let components: Vec<&str> = path.split(std::path::MAIN_SEPARATOR).collect();
    if components.len() <= n {
        return None;
    }
    Some(components[n..].join(std::path::MAIN_SEPARATOR_STR))
}

/// Parse an index file into its raw mapping.
fn read_index_map(file: &Path) -> Result<BTreeMap<String, IndexEntry>, StashError> {
    let bytes = std::fs::read(file)?;
    // `---` opens a YAML document; JSON leads with a brace or bracket.
    let head = &bytes[..bytes.len().min(4)];
    let json = head
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{' || *b == b'[');
    if json {
        serde_json::from_slice(&bytes).map_err(|e| StashError::load(format!("bad JSON index: {e}")))
    } else {
        serde_yml::from_slice(&bytes).map_err(|e| StashError::load(format!("bad YAML index: {e}")))
    }
}

/// Load an index file into a vault.
///
/// Path strings matching the archive grammar become archive paths — one
/// shared [`RomArchive`] per unique archive file — and everything else a
/// file path relative to the index's directory. Entries whose storage
/// mtime disagrees with the recorded timestamp (or whose storage is
/// missing) are offered to `out_of_sync`; a `false` reply drops them.
pub fn load_index(
    file: &Path,
    out_of_sync: &mut dyn FnMut(&Rom) -> bool,
) -> Result<Vault, StashError> {
    let index = read_index_map(file)?;
    let basedir = file.parent().unwrap_or(Path::new(".")).to_path_buf();

    let mut archives: HashMap<PathBuf, Arc<RomArchive>> = HashMap::new();
    let mut vault = Vault::new();

    for (path_string, entry) in &index {
        let rom = rom_from_entry(&basedir, path_string, entry, &mut archives)?;
        let in_sync = current_timestamp(&rom).is_some_and(|now| now == entry.timestamp);
        if !in_sync && !out_of_sync(&rom) {
            continue;
        }
        vault.push(rom);
    }
    Ok(vault)
}

fn rom_from_entry(
    basedir: &Path,
    path_string: &str,
    entry: &IndexEntry,
    archives: &mut HashMap<PathBuf, Arc<RomArchive>>,
) -> Result<Rom, StashError> {
    let checksums = entry.checksums()?;
    let archive_ref = split_archive_path(path_string)
        .filter(|(file, _)| registry::is_archive_path(Path::new(file)));

    let path = match archive_ref {
        Some((file, entry_name)) => {
            let archive_path = basedir.join(&file);
            let archive = match archives.get(&archive_path) {
                Some(shared) => shared.clone(),
                None => {
                    let created = RomArchive::for_path(&archive_path)?;
                    archives.insert(archive_path, created.clone());
                    created
                }
            };
            RomPath::from_archive(archive, entry_name)
        }
        None => {
            let raw = Path::new(path_string);
            let (entry, base) = if raw.is_absolute() {
                // Absolute keys (saved without a pathstrip) are split back
                // into base directory and entry.
                match raw.strip_prefix(basedir) {
                    Ok(relative) => (relative.to_path_buf(), basedir.to_path_buf()),
                    Err(_) => {
                        let name = raw
                            .file_name()
                            .ok_or_else(|| StashError::load(format!("bad path {path_string:?}")))?;
                        let parent = raw.parent().unwrap_or(Path::new("/")).to_path_buf();
                        (PathBuf::from(name), parent)
                    }
                }
            } else {
                (PathBuf::from(path_string), basedir.to_path_buf())
            };
            RomPath::from_file(entry, Some(base)).map_err(|e| StashError::load(e.to_string()))?
        }
    };

    Ok(Rom::new(path, entry.size, entry.offset, checksums))
}

/// Reconcile an index file with the filesystem.
///
/// Out-of-sync entries are re-digested (UPDATE), entries whose storage
/// vanished are dropped (REMOVE), archive rescans classify entries into
/// kept/new/removed, and with `adding` the index directory is rescanned
/// for unknown ROMs (ADD). The file is rewritten only when something
/// changed; returns whether it was.
pub fn update_index(
    file: &Path,
    adding: bool,
    format: IndexFormat,
    report: &mut dyn FnMut(UpdateEvent),
) -> Result<bool, StashError> {
    let basedir = file.parent().unwrap_or(Path::new(".")).to_path_buf();

    // Collect out-of-sync ROMs instead of keeping them.
    let mut stale: Vec<Rom> = Vec::new();
    let mut vault = load_index(file, &mut |rom| {
        stale.push(rom.clone());
        false
    })?;

    let mut changed = false;

    // Group stale entries by their storage so an archive is rescanned once.
    let mut stale_by_storage: Vec<(PathBuf, Vec<Rom>)> = Vec::new();
    for rom in stale {
        let Some(storage) = rom.path().file() else {
            continue;
        };
        match stale_by_storage.iter_mut().find(|(s, _)| *s == storage) {
            Some((_, group)) => group.push(rom),
            None => stale_by_storage.push((storage, vec![rom])),
        }
    }

    for (storage, group) in stale_by_storage {
        changed = true;
        if !storage.exists() {
            for rom in &group {
                report(UpdateEvent::Remove(rom.path().to_string()));
            }
            continue;
        }

        if registry::is_archive_path(&storage) {
            let archive = RomArchive::for_path(&storage)?;
            let current = archive.entries()?;
            let known: Vec<String> = group.iter().map(|r| r.path().entry()).collect();

            for rom in &group {
                if !current.contains(&rom.path().entry()) {
                    report(UpdateEvent::Remove(rom.path().to_string()));
                }
            }
            for entry_name in current {
                let is_new = !known.contains(&entry_name);
                if is_new && !adding {
                    continue;
                }
                let digest = digest_reader(archive.reader(&entry_name)?)?;
                let path = RomPath::from_archive(archive.clone(), entry_name);
                let rom = Rom::from_digest(path, digest);
                report(if is_new {
                    UpdateEvent::Add(rom.path().to_string())
                } else {
                    UpdateEvent::Update(rom.path().to_string())
                });
                vault.push(rom);
            }
        } else {
            let digest = digest_file(&storage)?;
            for rom in group {
                let refreshed = Rom::from_digest(rom.path().clone(), digest.clone());
                report(UpdateEvent::Update(refreshed.path().to_string()));
                vault.push(refreshed);
            }
        }
    }

    if adding {
        let mut rescan = Vault::new();
        rescan.add_from_dir(&basedir, None)?;
        let known: Vec<String> = vault.iter().map(|r| r.path().to_string()).collect();
        for rom in rescan.roms() {
            if rom.path().file().is_some_and(|f| f == file) {
                continue;
            }
            if known.contains(&rom.path().to_string()) {
                continue;
            }
            report(UpdateEvent::Add(rom.path().to_string()));
            vault.push(rom.clone());
            changed = true;
        }
    }

    if changed {
        // Keys go back relative to the index's own directory.
        let mut map = BTreeMap::new();
        for rom in vault.iter() {
            let Some(mtime) = rom.path().mtime() else {
                continue;
            };
            map.insert(
                relative_key(&rom.path().to_string(), &basedir),
                IndexEntry::new(rom, mtime),
            );
        }
        write_index_map(&map, file, format)?;
    }
    Ok(changed)
}

#[cfg(test)]
#[path = "tests/index_tests.rs"]
mod tests;
