//! Process-wide configuration for archive path strings.
//!
//! The separator joins an archive file name and an entry name into one
//! path string (`archive.zip#a/b.bin`). A two-character separator is
//! treated as a bracket pair (`archive.zip[a/b.bin]`). It is read on
//! every path-string round-trip and should be set once at startup.

use std::sync::RwLock;

static ARCHIVE_SEPARATOR: RwLock<Option<String>> = RwLock::new(None);

pub const DEFAULT_ARCHIVE_SEPARATOR: &str = "#";

/// Current archive path separator (default `#`).
pub fn archive_separator() -> String {
    ARCHIVE_SEPARATOR
        .read()
        .expect("separator lock poisoned")
        .clone()
        .unwrap_or_else(|| DEFAULT_ARCHIVE_SEPARATOR.to_string())
}

/// Set the archive path separator. Intended to be called once at startup.
pub fn set_archive_separator(sep: impl Into<String>) {
    let sep = sep.into();
    let mut guard = ARCHIVE_SEPARATOR.write().expect("separator lock poisoned");
    if let Some(old) = guard.as_deref() {
        if old != sep {
            log::warn!("archive separator changed from {old:?} to {sep:?}");
        }
    }
    *guard = Some(sep);
}

/// Join an archive file name and an entry name into one path string.
///
/// A single-character separator yields `file#entry`; a two-character
/// separator is a bracket pair yielding `file[entry]`.
pub fn archive_path_string(file: &str, entry: &str) -> String {
    join_with(&archive_separator(), file, entry)
}

/// Split a path string into `(file, entry)` along the archive separator.
///
/// Returns `None` when the string does not contain the separator, or when
/// a bracket-pair separator is unbalanced, or when either side is empty.
/// The caller decides whether the file side actually names an archive.
pub fn split_archive_path(path: &str) -> Option<(String, String)> {
    split_with(&archive_separator(), path)
}

fn join_with(sep: &str, file: &str, entry: &str) -> String {
    let mut chars = sep.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(open), Some(close), None) => format!("{file}{open}{entry}{close}"),
        _ => format!("{file}{sep}{entry}"),
    }
}

fn split_with(sep: &str, path: &str) -> Option<(String, String)> {
    let mut chars = sep.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(open), Some(close), None) => {
            let open_at = path.find(open)?;
            let rest = &path[open_at + open.len_utf8()..];
            let entry = rest.strip_suffix(close)?;
            let file = &path[..open_at];
            if file.is_empty() || entry.is_empty() {
                return None;
            }
            Some((file.to_string(), entry.to_string()))
        }
        _ => {
            let at = path.find(sep)?;
            let (file, rest) = path.split_at(at);
            let entry = &rest[sep.len()..];
            // Tolerate a trailing separator after the entry name.
            let entry = entry.strip_suffix(sep).unwrap_or(entry);
            if file.is_empty() || entry.is_empty() {
                return None;
            }
            Some((file.to_string(), entry.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
