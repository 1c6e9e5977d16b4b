use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;

use rom_stash_core::StashError;
use rom_stash_dat::parse_dat_file;
use rom_stash_lib::rename_to_catalog;

use crate::commands::scan_vault;
use crate::output::{emit, OutputMode};

#[derive(Serialize)]
struct RenameOutput {
    renamed: usize,
    deleted: usize,
    already_correct: usize,
    unmatched: usize,
    errors: Vec<String>,
}

pub fn run(
    dat_path: &Path,
    dir: &Path,
    force: bool,
    mode: OutputMode,
    verbose: bool,
) -> Result<u8, StashError> {
    let dat = parse_dat_file(dat_path)?;
    let mut vault = scan_vault(dir, mode)?;

    let summary = rename_to_catalog(&mut vault, &dat, force);
    let output = RenameOutput {
        renamed: summary.renamed,
        deleted: summary.deleted,
        already_correct: summary.already_correct,
        unmatched: summary.unmatched,
        errors: summary.errors,
    };

    if mode.is_structured() {
        emit(mode, &output)?;
    } else {
        println!(
            "renamed {}, deleted {}, already correct {}, unmatched {}",
            output.renamed, output.deleted, output.already_correct, output.unmatched
        );
        if verbose || !output.errors.is_empty() {
            for error in &output.errors {
                println!("  {}", error.if_supports_color(Stdout, |t| t.red()));
            }
        }
    }

    Ok(if output.errors.is_empty() { 0 } else { 1 })
}
