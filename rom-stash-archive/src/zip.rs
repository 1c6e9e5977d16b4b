//! Built-in zip provider over the `zip` crate.

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use rom_stash_core::StashError;

use crate::provider::ArchiveProvider;

/// In-process zip back-end. Reads stream from entries, writes create the
/// archive on demand; delete falls back to the staged-copy emulation.
#[derive(Debug, Default)]
pub struct ZipProvider;

fn zip_err(err: zip::result::ZipError) -> StashError {
    match err {
        zip::result::ZipError::Io(e) => StashError::Io(e),
        other => StashError::processing(format!("zip: {other}")),
    }
}

impl ArchiveProvider for ZipProvider {
    fn name(&self) -> &str {
        "zip"
    }

    fn extensions(&self) -> &[&str] {
        &["zip"]
    }

    fn mimetypes(&self) -> &[&str] {
        &["application/zip"]
    }

    fn write_enabled(&self) -> bool {
        true
    }

    fn list(&self, file: &Path) -> Result<Vec<String>, StashError> {
        let mut archive = ZipArchive::new(File::open(file)?).map_err(zip_err)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(zip_err)?;
            if entry.is_dir() {
                continue;
            }
            entries.push(entry.name().to_string());
        }
        Ok(entries)
    }

    fn read(&self, file: &Path, entry: &str) -> Result<Box<dyn Read>, StashError> {
        let mut archive = ZipArchive::new(File::open(file)?).map_err(zip_err)?;
        let mut zipped = archive.by_name(entry).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => {
                StashError::processing(format!("no entry {entry:?} in {}", file.display()))
            }
            other => zip_err(other),
        })?;
        let mut data = Vec::with_capacity(zipped.size() as usize);
        zipped.read_to_end(&mut data)?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn write(&self, file: &Path, entry: &str, data: &mut dyn Read) -> Result<(), StashError> {
        let mut writer = if file.exists() {
            let handle = OpenOptions::new().read(true).write(true).open(file)?;
            ZipWriter::new_append(handle).map_err(zip_err)?
        } else {
            ZipWriter::new(File::create(file)?)
        };
        writer
            .start_file(entry, SimpleFileOptions::default())
            .map_err(zip_err)?;
        io::copy(data, &mut writer)?;
        writer.finish().map_err(zip_err)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/zip_tests.rs"]
mod tests;
