use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;

use rom_stash_core::StashError;
use rom_stash_dat::parse_dat_file;
use rom_stash_lib::{validate, ValidateEvent};

use crate::commands::scan_vault;
use crate::output::{emit, progress_bar, OutputMode};

#[derive(Serialize)]
struct ValidateOutput {
    validated: usize,
    not_found: usize,
    missing_duplicate: usize,
    name_mismatch: usize,
    wrong_place: usize,
    errors: Vec<String>,
}

pub fn run(
    dat_path: &Path,
    dir: &Path,
    roots: &[String],
    mode: OutputMode,
    verbose: bool,
) -> Result<u8, StashError> {
    let dat = parse_dat_file(dat_path)?;
    let vault = scan_vault(dir, mode)?;

    let bar = progress_bar(mode, dat.games().len() as u64, "validating");
    let mut errors = Vec::new();

    let stats = validate(&vault, &dat, roots, &mut |event| match event {
        ValidateEvent::RomEnd {
            game,
            rom,
            error: Some(error),
        } => {
            let line = format!("{game}: {rom}: {error}");
            if verbose && !mode.is_structured() {
                bar.suspend(|| {
                    println!("{}", line.if_supports_color(Stdout, |t| t.yellow()));
                });
            }
            errors.push(line);
        }
        ValidateEvent::GameEnd { .. } => bar.inc(1),
        _ => {}
    });
    bar.finish_and_clear();

    let output = ValidateOutput {
        validated: stats.validated,
        not_found: stats.not_found,
        missing_duplicate: stats.missing_duplicate,
        name_mismatch: stats.name_mismatch,
        wrong_place: stats.wrong_place,
        errors,
    };

    if mode.is_structured() {
        emit(mode, &output)?;
    } else {
        println!(
            "validated {}, not found {}, missing duplicate {}, name mismatch {}, wrong place {}",
            output.validated,
            output.not_found,
            output.missing_duplicate,
            output.name_mismatch,
            output.wrong_place,
        );
        if stats.is_clean() {
            println!("{}", "clean".if_supports_color(Stdout, |t| t.green()));
        }
    }

    Ok(if stats.is_clean() { 0 } else { 1 })
}
