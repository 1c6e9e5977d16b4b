//! Dialect dispatch: Logiqx first, ClrMamePro second.

use std::path::Path;

use crate::error::DatError;
use crate::model::Dat;
use crate::{clrmamepro, logiqx};

/// Parse a DAT from raw bytes, auto-detecting the dialect.
pub fn parse_dat(bytes: &[u8]) -> Result<Dat, DatError> {
    if let Some(dat) = logiqx::parse(bytes)? {
        return Ok(dat);
    }
    let text = String::from_utf8_lossy(bytes);
    if let Some(dat) = clrmamepro::parse(&text)? {
        return Ok(dat);
    }
    Err(DatError::content(
        "neither a Logiqx nor a ClrMamePro DAT file",
    ))
}

/// Parse a DAT file from disk.
pub fn parse_dat_file(path: &Path) -> Result<Dat, DatError> {
    let bytes = std::fs::read(path)?;
    parse_dat(&bytes)
}

#[cfg(test)]
#[path = "tests/parse_tests.rs"]
mod tests;
