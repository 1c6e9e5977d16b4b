use std::path::Path;

use serde::Serialize;

use rom_stash_core::StashError;
use rom_stash_dat::parse_dat_file;
use rom_stash_lib::rebuild;

use crate::commands::scan_vault;
use crate::output::{emit, OutputMode};

#[derive(Serialize)]
struct RebuildOutput {
    games_built: usize,
    entries_written: usize,
    missing: Vec<String>,
}

pub fn run(
    dat_path: &Path,
    dir: &Path,
    dest: &Path,
    to: &str,
    mode: OutputMode,
) -> Result<u8, StashError> {
    let dat = parse_dat_file(dat_path)?;
    let vault = scan_vault(dir, mode)?;

    let summary = rebuild(dest, &dat, &vault, to)?;
    let output = RebuildOutput {
        games_built: summary.games_built,
        entries_written: summary.entries_written,
        missing: summary
            .missing
            .iter()
            .map(|(game, rom)| format!("{game}: {rom}"))
            .collect(),
    };

    if mode.is_structured() {
        emit(mode, &output)?;
    } else {
        println!(
            "built {} games ({} entries) into {}",
            output.games_built,
            output.entries_written,
            dest.display()
        );
        for missing in &output.missing {
            println!("  missing {missing}");
        }
    }

    Ok(if output.missing.is_empty() { 0 } else { 1 })
}
