use thiserror::Error;

use rom_stash_core::StashError;

/// Errors raised while parsing DAT catalogs.
#[derive(Debug, Error)]
pub enum DatError {
    /// I/O error while reading the DAT
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Malformed DAT content (bad checksum widths, duplicate game names)
    #[error("invalid DAT: {0}")]
    Content(String),
}

impl DatError {
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }
}

impl From<StashError> for DatError {
    fn from(err: StashError) -> Self {
        match err {
            StashError::Io(e) => Self::Io(e),
            other => Self::Content(other.to_string()),
        }
    }
}

impl From<DatError> for StashError {
    fn from(err: DatError) -> Self {
        match err {
            DatError::Io(e) => Self::Io(e),
            other => Self::Content(other.to_string()),
        }
    }
}
