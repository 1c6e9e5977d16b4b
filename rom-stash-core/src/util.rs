use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

/// Copy at most `len` bytes (all when `None`) from reader to writer.
/// Returns the number of bytes copied.
pub fn limited_copy<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    len: Option<u64>,
) -> io::Result<u64> {
    match len {
        Some(limit) => io::copy(&mut reader.take(limit), writer),
        None => io::copy(reader, writer),
    }
}

/// Byte-compare two files via streaming reads.
pub fn same_file_contents(a: &Path, b: &Path) -> io::Result<bool> {
    let meta_a = std::fs::metadata(a)?;
    let meta_b = std::fs::metadata(b)?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    same_stream_contents(
        BufReader::new(File::open(a)?),
        BufReader::new(File::open(b)?),
    )
}

/// Byte-compare two readers.
pub fn same_stream_contents<A: Read, B: Read>(mut a: A, mut b: B) -> io::Result<bool> {
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let n = a.read(&mut buf_a)?;
        // Match the read size on the other side so chunk boundaries line up.
        let mut got = 0;
        while got < n {
            let m = b.read(&mut buf_b[got..n])?;
            if m == 0 {
                return Ok(false);
            }
            got += m;
        }
        if n == 0 {
            // Left side is exhausted; the right must be too.
            return Ok(b.read(&mut buf_b[..1])? == 0);
        }
        if buf_a[..n] != buf_b[..n] {
            return Ok(false);
        }
    }
}

#[cfg(test)]
#[path = "tests/util_tests.rs"]
mod tests;
