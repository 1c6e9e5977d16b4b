//! The ROM descriptor: a path bound to size, header offset and checksums.

use std::io::Read;
use std::path::Path;

use crate::checksum::{ChecksumKind, ChecksumSet};
use crate::digest::DigestResult;
use crate::error::StashError;
use crate::path::RomPath;

/// A descriptor's identity attributes, detached from its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomInfo {
    pub checksums: ChecksumSet,
    pub size: Option<u64>,
    /// Omitted when zero
    pub offset: Option<u64>,
}

/// Which byte range of a ROM file to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPart {
    /// The whole file, header included
    All,
    /// From the header offset to end of file
    Rom,
    /// The header bytes only
    Header,
}

/// A ROM descriptor.
///
/// `size` excludes any detected header; `offset` is the header length and
/// is defined (zero when unheadered) whenever `size` is known. Virtual
/// catalog entries may omit both.
#[derive(Debug, Clone)]
pub struct Rom {
    path: RomPath,
    size: Option<u64>,
    offset: Option<u64>,
    checksums: ChecksumSet,
}

impl Rom {
    /// Bind a path to size, offset and checksums.
    ///
    /// Zero-size ROMs always acquire the full nil-checksum map; a warning
    /// is logged when supplied checksums disagree with it. A known size
    /// implies a defined offset; an unknown size clears the offset.
    pub fn new(
        path: RomPath,
        size: Option<u64>,
        offset: Option<u64>,
        checksums: ChecksumSet,
    ) -> Self {
        let (size, offset, checksums) = match size {
            Some(0) => {
                if !checksums.is_empty() && !checksums.is_nil() {
                    log::warn!("zero-size ROM {path} carries non-nil checksums, replacing");
                }
                (Some(0), Some(offset.unwrap_or(0)), ChecksumSet::nil())
            }
            Some(n) => (Some(n), Some(offset.unwrap_or(0)), checksums),
            None => (None, None, checksums),
        };
        Rom {
            path,
            size,
            offset,
            checksums,
        }
    }

    /// Build a descriptor from a digest pass over `path`.
    pub fn from_digest(path: RomPath, digest: DigestResult) -> Self {
        Self::new(
            path,
            Some(digest.size),
            Some(digest.offset),
            digest.checksums,
        )
    }

    pub fn path(&self) -> &RomPath {
        &self.path
    }

    pub fn path_mut(&mut self) -> &mut RomPath {
        &mut self.path
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Header length in bytes; zero when unheadered, `None` when unknown.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn checksums(&self) -> &ChecksumSet {
        &self.checksums
    }

    pub fn name(&self) -> String {
        self.path.entry()
    }

    /// The checksum map plus size and offset (omitted when zero).
    pub fn info(&self) -> RomInfo {
        RomInfo {
            checksums: self.checksums.clone(),
            size: self.size,
            offset: self.offset.filter(|&o| o > 0),
        }
    }

    /// True iff every checksum in `required` is present.
    pub fn has_checksums(&self, required: &[ChecksumKind]) -> bool {
        self.checksums.contains_all(required)
    }

    pub fn headered(&self) -> bool {
        self.offset.is_some_and(|o| o > 0)
    }

    /// Read the header bytes, or `None` for unheadered ROMs.
    pub fn header(&self) -> Result<Option<Vec<u8>>, StashError> {
        let offset = match self.offset {
            Some(o) if o > 0 => o,
            _ => return Ok(None),
        };
        let mut reader = self.path.reader()?.take(offset);
        let mut bytes = Vec::with_capacity(offset as usize);
        reader.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    /// Compare two descriptors by their checksums.
    ///
    /// `Some(true)`/`Some(false)` when a shared checksum kind decides;
    /// `None` when no kind is defined on both sides.
    pub fn same(&self, other: &Rom) -> Option<bool> {
        self.checksums.same(other.checksums())
    }

    /// Copy a part of the ROM to `dst`.
    ///
    /// `All` copies the physical file; `Rom` copies from the header offset
    /// to the end; `Header` copies the header bytes and fails on
    /// unheadered ROMs.
    pub fn copy(
        &self,
        dst: &Path,
        part: CopyPart,
        force: bool,
        link: bool,
    ) -> Result<bool, StashError> {
        let offset = self.offset.unwrap_or(0);
        match part {
            CopyPart::All => self.path.copy(dst, None, 0, force, link),
            CopyPart::Rom => self.path.copy(dst, None, offset, force, link && offset == 0),
            CopyPart::Header => {
                if !self.headered() {
                    return Err(StashError::processing(format!(
                        "{} has no header to copy",
                        self.path
                    )));
                }
                self.path.copy(dst, Some(offset), 0, force, false)
            }
        }
    }

    /// Rename the ROM's entry within its storage.
    pub fn rename(&mut self, new_entry: &str, force: bool) -> Result<bool, StashError> {
        self.path.rename(new_entry, force)
    }

    /// Delete the physical target; the path collapses to virtual.
    pub fn delete(&mut self) -> Result<bool, StashError> {
        self.path.delete()
    }
}

#[cfg(test)]
#[path = "tests/rom_tests.rs"]
mod tests;
