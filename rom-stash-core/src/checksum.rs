use std::fmt;

use crate::error::StashError;

/// Checksum kinds a ROM may carry, in decreasing strength order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumKind {
    /// SHA-256 (256-bit)
    Sha256,
    /// SHA-1 (160-bit)
    Sha1,
    /// MD5 (128-bit)
    Md5,
    /// CRC-32, IEEE 802.3 polynomial (32-bit)
    Crc32,
}

/// SHA-256 of the empty byte string.
const NIL_SHA256: [u8; 32] = [
    0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f, 0xb9,
    0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b, 0x78, 0x52,
    0xb8, 0x55,
];

/// SHA-1 of the empty byte string.
const NIL_SHA1: [u8; 20] = [
    0xda, 0x39, 0xa3, 0xee, 0x5e, 0x6b, 0x4b, 0x0d, 0x32, 0x55, 0xbf, 0xef, 0x95, 0x60, 0x18,
    0x90, 0xaf, 0xd8, 0x07, 0x09,
];

/// MD5 of the empty byte string.
const NIL_MD5: [u8; 16] = [
    0xd4, 0x1d, 0x8c, 0xd9, 0x8f, 0x00, 0xb2, 0x04, 0xe9, 0x80, 0x09, 0x98, 0xec, 0xf8, 0x42,
    0x7e,
];

/// CRC-32 of the empty byte string.
const NIL_CRC32: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

impl ChecksumKind {
    /// All kinds in decreasing strength order (strongest first).
    pub const STRENGTH_ORDER: [ChecksumKind; 4] = [
        ChecksumKind::Sha256,
        ChecksumKind::Sha1,
        ChecksumKind::Md5,
        ChecksumKind::Crc32,
    ];

    /// Checksums considered collision-weak.
    pub const WEAK: [ChecksumKind; 1] = [ChecksumKind::Crc32];

    /// The checksum used for content-addressed filesystem names.
    pub const FILE_NAMING: ChecksumKind = ChecksumKind::Sha1;

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
            Self::Crc32 => "crc32",
        }
    }

    /// Digest width in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha1 => 20,
            Self::Md5 => 16,
            Self::Crc32 => 4,
        }
    }

    /// Canonical lowercase hex string length.
    pub fn hex_len(&self) -> usize {
        self.width() * 2
    }

    pub fn is_weak(&self) -> bool {
        Self::WEAK.contains(self)
    }

    /// Digest of the empty byte string.
    pub fn nil_value(&self) -> &'static [u8] {
        match self {
            Self::Sha256 => &NIL_SHA256,
            Self::Sha1 => &NIL_SHA1,
            Self::Md5 => &NIL_MD5,
            Self::Crc32 => &NIL_CRC32,
        }
    }

    fn slot(&self) -> usize {
        match self {
            Self::Sha256 => 0,
            Self::Sha1 => 1,
            Self::Md5 => 2,
            Self::Crc32 => 3,
        }
    }
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A partial map of checksum values keyed by kind.
///
/// Values are stored as canonical binary; hex input is accepted
/// case-insensitively and rejected when the width is wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumSet {
    values: [Option<Box<[u8]>>; 4],
}

impl ChecksumSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full nil-content map (every kind set to its empty-string digest).
    pub fn nil() -> Self {
        let mut set = Self::new();
        for kind in ChecksumKind::STRENGTH_ORDER {
            set.values[kind.slot()] = Some(kind.nil_value().into());
        }
        set
    }

    /// Insert a binary checksum value, rejecting wrong widths.
    pub fn insert(&mut self, kind: ChecksumKind, value: &[u8]) -> Result<(), StashError> {
        if value.len() != kind.width() {
            return Err(StashError::content(format!(
                "{} checksum must be {} bytes, got {}",
                kind,
                kind.width(),
                value.len()
            )));
        }
        self.values[kind.slot()] = Some(value.into());
        Ok(())
    }

    /// Insert a hex checksum value, rejecting wrong lengths and non-hex input.
    pub fn insert_hex(&mut self, kind: ChecksumKind, hex: &str) -> Result<(), StashError> {
        if hex.len() != kind.hex_len() {
            return Err(StashError::content(format!(
                "{} checksum must be {} hex chars, got {}",
                kind,
                kind.hex_len(),
                hex.len()
            )));
        }
        let bytes = decode_hex(hex).ok_or_else(|| {
            StashError::content(format!("{kind} checksum is not valid hex: {hex:?}"))
        })?;
        self.insert(kind, &bytes)
    }

    pub fn get(&self, kind: ChecksumKind) -> Option<&[u8]> {
        self.values[kind.slot()].as_deref()
    }

    /// Canonical lowercase hex rendition of one value.
    pub fn hex(&self, kind: ChecksumKind) -> Option<String> {
        self.get(kind).map(encode_hex)
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_none())
    }

    /// Kinds present in this set, strongest first.
    pub fn kinds(&self) -> impl Iterator<Item = ChecksumKind> + '_ {
        ChecksumKind::STRENGTH_ORDER
            .into_iter()
            .filter(|k| self.get(*k).is_some())
    }

    /// True iff every kind in `required` is present.
    pub fn contains_all(&self, required: &[ChecksumKind]) -> bool {
        required.iter().all(|k| self.get(*k).is_some())
    }

    /// True iff every present value equals its kind's nil constant.
    pub fn is_nil(&self) -> bool {
        !self.is_empty()
            && ChecksumKind::STRENGTH_ORDER
                .into_iter()
                .all(|k| self.get(k).is_none_or(|v| v == k.nil_value()))
    }

    /// Compare with another set over the kinds both define.
    ///
    /// `Some(true)` as soon as the strongest shared kind coincides;
    /// `Some(false)` when a shared kind differs; `None` when no kind is
    /// defined on both sides. A weak-only coincidence still yields
    /// `Some(true)`.
    pub fn same(&self, other: &ChecksumSet) -> Option<bool> {
        for kind in ChecksumKind::STRENGTH_ORDER {
            match (self.get(kind), other.get(kind)) {
                (Some(a), Some(b)) => return Some(a == b),
                _ => continue,
            }
        }
        None
    }
}

/// Encode bytes as lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string to bytes; `None` on any non-hex digit or odd length.
pub fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
#[path = "tests/checksum_tests.rs"]
mod tests;
