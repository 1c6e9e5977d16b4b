//! Polymorphic ROM locations.
//!
//! A ROM lives in one of three places: a plain file under an optional
//! base directory, an entry inside an archive container, or nowhere at
//! all (a virtual reference carried over from a catalog). All three
//! support the same operation surface; rename and delete may collapse a
//! physical path into a virtual one when the target vanishes.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::archive_path_string;
use crate::error::StashError;
use crate::util::{limited_copy, same_file_contents};

/// Operations an archive container offers to the paths inside it.
///
/// Implemented by the archive crate; kept as a trait here so the path
/// model does not depend on any container format.
pub trait ArchiveHandle: fmt::Debug + Send + Sync {
    /// Filesystem path of the archive file.
    fn path(&self) -> &Path;

    fn exists(&self) -> bool;

    /// Entry names, in archive order.
    fn entries(&self) -> Result<Vec<String>, StashError>;

    /// Open a read stream on one entry.
    fn reader(&self, entry: &str) -> Result<Box<dyn Read>, StashError>;

    /// Extract one entry to `dst`, skipping `offset` bytes and limiting to
    /// `len` when given. Returns false when `dst` exists and `force` is off.
    fn extract(
        &self,
        entry: &str,
        dst: &Path,
        len: Option<u64>,
        offset: u64,
        force: bool,
    ) -> Result<bool, StashError>;

    /// Remove one entry; unlinks the archive file when it empties.
    fn delete_entry(&self, entry: &str) -> Result<bool, StashError>;

    /// Rename one entry inside the archive.
    fn rename_entry(&self, from: &str, to: &str, force: bool) -> Result<bool, StashError>;

    /// Modification time of the archive file.
    fn mtime(&self) -> Option<SystemTime>;
}

/// Where a ROM's bytes live.
#[derive(Debug, Clone)]
pub enum RomPath {
    /// A plain file `entry`, relative to `basedir` when given.
    File {
        entry: PathBuf,
        basedir: Option<PathBuf>,
    },
    /// An `entry` inside an archive container.
    Archive {
        archive: Arc<dyn ArchiveHandle>,
        entry: String,
    },
    /// A catalog-only reference with no physical storage.
    Virtual { entry: String },
}

impl RomPath {
    /// Build a File path. The entry must be relative.
    pub fn from_file(
        entry: impl Into<PathBuf>,
        basedir: Option<PathBuf>,
    ) -> Result<Self, StashError> {
        let entry = entry.into();
        if entry.is_absolute() {
            return Err(StashError::content(format!(
                "file entry must be relative: {}",
                entry.display()
            )));
        }
        Ok(RomPath::File { entry, basedir })
    }

    pub fn from_archive(archive: Arc<dyn ArchiveHandle>, entry: impl Into<String>) -> Self {
        RomPath::Archive {
            archive,
            entry: entry.into(),
        }
    }

    pub fn from_entry_name(entry: impl Into<String>) -> Self {
        RomPath::Virtual {
            entry: entry.into(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, RomPath::Virtual { .. })
    }

    /// The filesystem target, if the path has one.
    pub fn file(&self) -> Option<PathBuf> {
        match self {
            RomPath::File { entry, basedir } => Some(match basedir {
                Some(base) => base.join(entry),
                None => entry.clone(),
            }),
            RomPath::Archive { archive, .. } => Some(archive.path().to_path_buf()),
            RomPath::Virtual { .. } => None,
        }
    }

    /// The grouping container: the base directory for files, the archive
    /// file for archive entries.
    pub fn storage(&self) -> Option<PathBuf> {
        match self {
            RomPath::File { entry, basedir } => match basedir {
                Some(base) => Some(base.clone()),
                None => entry.parent().map(Path::to_path_buf),
            },
            RomPath::Archive { archive, .. } => Some(archive.path().to_path_buf()),
            RomPath::Virtual { .. } => None,
        }
    }

    /// The relative entry name within the storage.
    pub fn entry(&self) -> String {
        match self {
            RomPath::File { entry, .. } => entry.to_string_lossy().into_owned(),
            RomPath::Archive { entry, .. } => entry.clone(),
            RomPath::Virtual { entry } => entry.clone(),
        }
    }

    /// Last path segment of the entry.
    pub fn basename(&self) -> String {
        let entry = self.entry();
        entry
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(entry.as_str())
            .to_string()
    }

    /// Open a read stream on the ROM bytes (header included).
    pub fn reader(&self) -> Result<Box<dyn Read>, StashError> {
        match self {
            RomPath::File { .. } => {
                let file = File::open(self.file().expect("file path has a target"))?;
                Ok(Box::new(io::BufReader::new(file)))
            }
            RomPath::Archive { archive, entry } => archive.reader(entry),
            RomPath::Virtual { entry } => Err(StashError::not_supported(format!(
                "virtual path {entry:?} has no data"
            ))),
        }
    }

    /// Copy the target to `dst`.
    ///
    /// `offset` skips leading bytes and `len` limits the copied range; a
    /// partial copy never hardlinks. With `link` and a whole-file copy, a
    /// hardlink is attempted first and silently degrades to a byte copy.
    /// Returns false when `dst` exists and `force` is off, or for virtual
    /// paths, which have nothing to copy.
    pub fn copy(
        &self,
        dst: &Path,
        len: Option<u64>,
        offset: u64,
        force: bool,
        link: bool,
    ) -> Result<bool, StashError> {
        match self {
            RomPath::File { .. } => {
                let src = self.file().expect("file path has a target");
                if dst.exists() {
                    if !force {
                        return Ok(false);
                    }
                    fs::remove_file(dst)?;
                }
                let whole = offset == 0 && len.is_none();
                if link && whole && fs::hard_link(&src, dst).is_ok() {
                    return Ok(true);
                }
                let mut reader = File::open(&src)?;
                reader.seek(SeekFrom::Start(offset))?;
                let mut writer = File::create(dst)?;
                limited_copy(&mut reader, &mut writer, len)?;
                writer.flush()?;
                Ok(true)
            }
            RomPath::Archive { archive, entry } => archive.extract(entry, dst, len, offset, force),
            RomPath::Virtual { .. } => Ok(false),
        }
    }

    /// Rename the entry within its storage.
    ///
    /// Renaming to the current name is a no-op returning true. When the
    /// target already holds identical content the source is deleted and
    /// the path adopts the target. An existing, differing target returns
    /// false unless `force` overwrites it.
    pub fn rename(&mut self, new_entry: &str, force: bool) -> Result<bool, StashError> {
        match self {
            RomPath::File { entry, basedir } => {
                if entry.as_os_str() == std::ffi::OsStr::new(new_entry) {
                    return Ok(true);
                }
                let src = match basedir {
                    Some(base) => base.join(&*entry),
                    None => entry.clone(),
                };
                let dst = match basedir {
                    Some(base) => base.join(new_entry),
                    None => PathBuf::from(new_entry),
                };
                if dst.exists() {
                    if same_file_contents(&src, &dst)? {
                        fs::remove_file(&src)?;
                        *entry = PathBuf::from(new_entry);
                        return Ok(true);
                    }
                    if !force {
                        return Ok(false);
                    }
                }
                if let Some(parent) = dst.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::rename(&src, &dst)?;
                *entry = PathBuf::from(new_entry);
                Ok(true)
            }
            RomPath::Archive { archive, entry } => {
                if entry == new_entry {
                    return Ok(true);
                }
                let renamed = archive.rename_entry(entry, new_entry, force)?;
                if renamed {
                    *entry = new_entry.to_string();
                }
                Ok(renamed)
            }
            RomPath::Virtual { entry } => {
                *entry = new_entry.to_string();
                Ok(true)
            }
        }
    }

    /// Delete the physical target and collapse to a virtual path.
    ///
    /// Virtual paths are a no-op returning true.
    pub fn delete(&mut self) -> Result<bool, StashError> {
        match self {
            RomPath::File { .. } => {
                let target = self.file().expect("file path has a target");
                let entry = self.entry();
                fs::remove_file(&target)?;
                *self = RomPath::Virtual { entry };
                Ok(true)
            }
            RomPath::Archive { archive, entry } => {
                let name = entry.clone();
                let deleted = archive.delete_entry(&name)?;
                if deleted {
                    *self = RomPath::Virtual { entry: name };
                }
                Ok(deleted)
            }
            RomPath::Virtual { .. } => Ok(true),
        }
    }

    /// Modification time of the storage, when it exists.
    pub fn mtime(&self) -> Option<SystemTime> {
        match self {
            RomPath::File { .. } => {
                let target = self.file()?;
                fs::metadata(target).and_then(|m| m.modified()).ok()
            }
            RomPath::Archive { archive, .. } => archive.mtime(),
            RomPath::Virtual { .. } => None,
        }
    }

    /// True when both paths name the same location.
    pub fn same_location(&self, other: &RomPath) -> bool {
        match (self, other) {
            (
                RomPath::File { entry: a, basedir: ab },
                RomPath::File { entry: b, basedir: bb },
            ) => a == b && ab == bb,
            (
                RomPath::Archive { archive: a, entry: ae },
                RomPath::Archive { archive: b, entry: be },
            ) => a.path() == b.path() && ae == be,
            (RomPath::Virtual { entry: a }, RomPath::Virtual { entry: b }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for RomPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RomPath::File { .. } => {
                write!(f, "{}", self.file().expect("file path has a target").display())
            }
            RomPath::Archive { archive, entry } => f.write_str(&archive_path_string(
                &archive.path().to_string_lossy(),
                entry,
            )),
            RomPath::Virtual { entry } => f.write_str(entry),
        }
    }
}

impl PartialEq for RomPath {
    fn eq(&self, other: &Self) -> bool {
        self.same_location(other)
    }
}

#[cfg(test)]
#[path = "tests/path_tests.rs"]
mod tests;
