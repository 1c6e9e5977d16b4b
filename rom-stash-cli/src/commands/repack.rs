use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;

use rom_stash_archive::repack;
use rom_stash_core::StashError;

use crate::output::{emit, OutputMode};

#[derive(Serialize)]
struct RepackOutput {
    repacked: Vec<String>,
    failed: Vec<String>,
}

pub fn run(
    files: &[PathBuf],
    to: &str,
    dry_run: bool,
    mode: OutputMode,
) -> Result<u8, StashError> {
    let mut output = RepackOutput {
        repacked: Vec::new(),
        failed: Vec::new(),
    };

    for file in files {
        match repack(file, to, dry_run) {
            Ok(true) => {
                if !mode.is_structured() {
                    report_one(file, to, dry_run);
                }
                output.repacked.push(file.display().to_string());
            }
            Ok(false) => {
                if !mode.is_structured() {
                    println!(
                        "{} {}",
                        "failed:".if_supports_color(Stdout, |t| t.red()),
                        file.display()
                    );
                }
                output.failed.push(file.display().to_string());
            }
            Err(err) => {
                // One bad archive does not stop the batch.
                if !mode.is_structured() {
                    println!(
                        "{} {}: {err}",
                        "failed:".if_supports_color(Stdout, |t| t.red()),
                        file.display()
                    );
                }
                output.failed.push(file.display().to_string());
            }
        }
    }

    if mode.is_structured() {
        emit(mode, &output)?;
    }
    Ok(if output.failed.is_empty() { 0 } else { 1 })
}

fn report_one(file: &Path, to: &str, dry_run: bool) {
    let dst = file.with_extension(to);
    if dry_run {
        println!("would repack {} -> {}", file.display(), dst.display());
    } else {
        println!("repacked {} -> {}", file.display(), dst.display());
    }
}
