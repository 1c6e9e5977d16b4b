use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Random 10-character alphanumeric suffix for staging files.
pub fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

/// Sibling path `<file>.<tag>-<random>` used for staging rewrites.
pub fn staging_path(file: &Path, tag: &str) -> PathBuf {
    let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    file.with_file_name(format!("{}.{}-{}", name, tag, random_suffix()))
}

#[cfg(test)]
#[path = "tests/util_tests.rs"]
mod tests;
