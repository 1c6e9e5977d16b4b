use std::path::Path;

use serde::Serialize;

use rom_stash_core::StashError;
use rom_stash_dat::parse_dat_file;
use rom_stash_lib::clean;

use crate::commands::scan_vault;
use crate::output::{emit, OutputMode};

#[derive(Serialize)]
struct CleanOutput {
    deleted: Vec<String>,
    errors: Vec<String>,
}

pub fn run(
    dat_path: &Path,
    dir: &Path,
    trash: Option<&Path>,
    mode: OutputMode,
) -> Result<u8, StashError> {
    let dat = parse_dat_file(dat_path)?;
    let mut vault = scan_vault(dir, mode)?;

    let structured = mode.is_structured();
    let summary = clean(&mut vault, &dat, trash, &mut |path| {
        if !structured {
            println!("deleted {path}");
        }
    })?;

    let output = CleanOutput {
        deleted: summary.deleted,
        errors: summary.errors,
    };

    if structured {
        emit(mode, &output)?;
    } else {
        println!("deleted {} extras", output.deleted.len());
        for error in &output.errors {
            println!("  {error}");
        }
    }

    Ok(if output.errors.is_empty() { 0 } else { 1 })
}
