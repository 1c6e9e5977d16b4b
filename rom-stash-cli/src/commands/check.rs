use std::collections::BTreeMap;
use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;

use rom_stash_core::StashError;
use rom_stash_dat::parse_dat_file;
use rom_stash_lib::check;

use crate::commands::scan_vault;
use crate::output::{emit, OutputMode};

#[derive(Serialize)]
struct CheckOutput {
    perfect: bool,
    total: usize,
    included: BTreeMap<String, Vec<String>>,
    missing: Vec<String>,
    extra: Vec<String>,
}

pub fn run(
    dat_path: &Path,
    dir: &Path,
    mode: OutputMode,
    verbose: bool,
) -> Result<u8, StashError> {
    let dat = parse_dat_file(dat_path)?;
    let vault = scan_vault(dir, mode)?;
    let report = check(&vault, &dat);

    let output = CheckOutput {
        perfect: report.perfect(),
        total: report.total,
        included: report
            .included
            .iter()
            .map(|(game, roms)| (game.clone(), roms.clone()))
            .collect(),
        missing: report.missing.iter().map(|r| r.name()).collect(),
        extra: report.extra.iter().map(|r| r.path().to_string()).collect(),
    };

    if mode.is_structured() {
        emit(mode, &output)?;
    } else {
        println!(
            "{}: {}/{} cataloged ROMs present, {} missing, {} extra",
            dat.meta().name,
            report.included_count(),
            report.total,
            output.missing.len(),
            output.extra.len(),
        );
        if verbose {
            for name in &output.missing {
                println!("  {} {name}", "missing".if_supports_color(Stdout, |t| t.red()));
            }
            for name in &output.extra {
                println!("  {}   {name}", "extra".if_supports_color(Stdout, |t| t.yellow()));
            }
        }
        if report.perfect() {
            println!("{}", "perfect".if_supports_color(Stdout, |t| t.green()));
        }
    }

    Ok(if report.perfect() { 0 } else { 1 })
}
