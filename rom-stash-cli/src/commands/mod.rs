pub mod check;
pub mod clean;
pub mod header;
pub mod index;
pub mod rebuild;
pub mod rename;
pub mod repack;
pub mod validate;

use std::path::Path;

use rom_stash_core::StashError;
use rom_stash_vault::Vault;

use crate::output::{spinner, OutputMode};

/// Scan a directory into a vault, with a spinner in fancy mode.
pub fn scan_vault(dir: &Path, mode: OutputMode) -> Result<Vault, StashError> {
    let progress = spinner(mode, "scanning");
    let mut vault = Vault::new();
    vault.add_from_dir(dir, None)?;
    progress.finish_and_clear();
    Ok(vault)
}
