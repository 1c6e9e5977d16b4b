//! Streaming checksum computation.
//!
//! One pass over the source computes SHA-256, SHA-1, MD5 and CRC-32
//! together. The header detector is consulted on the first chunk; when a
//! header is recognized those bytes are excluded from every digest and
//! reported as `offset`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use md5::Md5;
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::checksum::{ChecksumKind, ChecksumSet};
use crate::error::StashError;
use crate::header::detect_header;

/// Chunk size for streaming reads.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Result of digesting one source.
#[derive(Debug, Clone)]
pub struct DigestResult {
    pub checksums: ChecksumSet,
    /// Byte count excluding any detected header
    pub size: u64,
    /// Detected header length; zero when unheadered
    pub offset: u64,
}

/// Digest a reader in `CHUNK_SIZE` chunks, skipping a detected header.
pub fn digest_reader<R: Read>(mut reader: R) -> Result<DigestResult, StashError> {
    let mut buf = vec![0u8; CHUNK_SIZE];

    // Fill the first chunk completely so the header rules have as much to
    // look at as the stream can give.
    let mut first = 0;
    while first < buf.len() {
        let n = reader.read(&mut buf[first..])?;
        if n == 0 {
            break;
        }
        first += n;
    }

    // A truncated lookup means some rule reached past end-of-stream; the
    // file is treated as unheadered rather than failing the digest.
    let offset = match detect_header(&buf[..first]) {
        Ok(Some(format)) => format.header_len.min(first as u64),
        Ok(None) | Err(_) => 0,
    };

    let mut sha256 = Sha256::new();
    let mut sha1 = Sha1::new();
    let mut md5 = Md5::new();
    let mut crc32 = crc32fast::Hasher::new();
    let mut size: u64 = 0;

    let mut update = |chunk: &[u8]| {
        sha256.update(chunk);
        sha1.update(chunk);
        md5.update(chunk);
        crc32.update(chunk);
        size += chunk.len() as u64;
    };

    update(&buf[offset as usize..first]);

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        update(&buf[..n]);
    }

    let mut checksums = ChecksumSet::new();
    checksums.insert(ChecksumKind::Sha256, &sha256.finalize())?;
    checksums.insert(ChecksumKind::Sha1, &sha1.finalize())?;
    checksums.insert(ChecksumKind::Md5, &md5.finalize())?;
    checksums.insert(ChecksumKind::Crc32, &crc32.finalize().to_be_bytes())?;

    Ok(DigestResult {
        checksums,
        size,
        offset,
    })
}

/// Digest a plain file.
pub fn digest_file(path: &Path) -> Result<DigestResult, StashError> {
    let file = File::open(path)?;
    digest_reader(BufReader::with_capacity(CHUNK_SIZE, file))
}

#[cfg(test)]
#[path = "tests/digest_tests.rs"]
mod tests;
