pub mod cancel;
pub mod checksum;
pub mod config;
pub mod digest;
pub mod error;
pub mod header;
pub mod path;
pub mod rom;
pub mod util;

pub use checksum::{ChecksumKind, ChecksumSet};
pub use config::{archive_separator, set_archive_separator};
pub use digest::{digest_file, digest_reader, DigestResult, CHUNK_SIZE};
pub use error::StashError;
pub use header::{detect_header, HeaderFormat, HeaderRule, HEADER_FORMATS};
pub use path::{ArchiveHandle, RomPath};
pub use rom::{CopyPart, Rom, RomInfo};
