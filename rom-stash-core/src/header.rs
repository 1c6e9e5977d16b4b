//! Detection of system-specific ROM headers.
//!
//! Some dump formats prefix the ROM data with a fixed-size header that
//! must be stripped before content addressing. Detection matches a static
//! table of byte signatures against the start of the file; the first
//! record whose rules all match wins.

/// A single signature rule: `signature` bytes expected at `offset`.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    pub offset: usize,
    pub signature: &'static [u8],
}

/// A known header format for one system.
#[derive(Debug, Clone, Copy)]
pub struct HeaderFormat {
    /// System name (e.g., "Nintendo Entertainment System")
    pub system: &'static str,
    /// Conventional dump extension for this system
    pub extension: &'static str,
    /// All rules must match for the format to apply
    pub rules: &'static [HeaderRule],
    /// Header length in bytes, stripped before checksumming
    pub header_len: u64,
}

impl HeaderFormat {
    /// The furthest byte any rule of this format inspects.
    fn reach(&self) -> usize {
        self.rules
            .iter()
            .map(|r| r.offset + r.signature.len())
            .max()
            .unwrap_or(0)
    }
}

/// All known header formats. First match wins.
pub static HEADER_FORMATS: &[HeaderFormat] = &[
    HeaderFormat {
        system: "Famicom Disk System",
        extension: "fds",
        rules: &[HeaderRule {
            offset: 0,
            signature: b"FDS",
        }],
        header_len: 16,
    },
    HeaderFormat {
        system: "Nintendo Entertainment System",
        extension: "nes",
        rules: &[HeaderRule {
            offset: 0,
            signature: b"NES",
        }],
        header_len: 16,
    },
    HeaderFormat {
        system: "Atari Lynx",
        extension: "lnx",
        rules: &[HeaderRule {
            offset: 0,
            signature: b"LYNX",
        }],
        header_len: 64,
    },
    HeaderFormat {
        system: "Atari 7800",
        extension: "a78",
        rules: &[
            HeaderRule {
                offset: 1,
                signature: b"ATARI7800",
            },
            HeaderRule {
                offset: 96,
                signature: b"ACTUAL CART DATA STARTS HERE",
            },
        ],
        header_len: 128,
    },
];

/// The sample was too short for a rule to be decided either way.
///
/// Never propagated past the digest engine; a stream that ends before a
/// rule's reach is treated as unheadered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLookupError;

/// Match `sample` (the start of a file) against the header table.
///
/// Returns the first matching format, `Ok(None)` when no format matches,
/// or `Err(HeaderLookupError)` when the sample ended before some rule
/// could be decided and no earlier format matched outright.
pub fn detect_header(sample: &[u8]) -> Result<Option<&'static HeaderFormat>, HeaderLookupError> {
    let mut truncated = false;

    for format in HEADER_FORMATS {
        if sample.len() < format.reach() {
            // A rule demanded bytes past the end of the sample; the format
            // can neither match nor be ruled out.
            truncated = true;
            continue;
        }
        let matches = format
            .rules
            .iter()
            .all(|rule| &sample[rule.offset..rule.offset + rule.signature.len()] == rule.signature);
        if matches {
            return Ok(Some(format));
        }
    }

    if truncated {
        Err(HeaderLookupError)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "tests/header_tests.rs"]
mod tests;
