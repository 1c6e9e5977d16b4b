use std::path::PathBuf;

use serde::Serialize;

use rom_stash_core::digest::digest_file;
use rom_stash_core::{CopyPart, Rom, RomPath, StashError};

use crate::output::{emit, OutputMode};

#[derive(Serialize)]
struct HeaderOutput {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    header_length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stripped_to: Option<String>,
}

pub fn run(
    files: &[PathBuf],
    strip: bool,
    mode: OutputMode,
    force: bool,
) -> Result<u8, StashError> {
    let mut reports = Vec::new();

    for file in files {
        let sample = read_sample(file)?;
        let format = rom_stash_core::detect_header(&sample).unwrap_or(None);

        let mut report = HeaderOutput {
            file: file.display().to_string(),
            system: format.map(|f| f.system.to_string()),
            header_length: format.map(|f| f.header_len).unwrap_or(0),
            stripped_to: None,
        };

        if strip && format.is_some() {
            let digest = digest_file(file)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let basedir = file.parent().map(|p| p.to_path_buf());
            let rom = Rom::from_digest(RomPath::from_file(name, basedir)?, digest);

            let target = file.with_extension("rom");
            if rom.copy(&target, CopyPart::Rom, force, false)? {
                report.stripped_to = Some(target.display().to_string());
            }
        }

        if !mode.is_structured() {
            match &report.system {
                Some(system) => {
                    print!(
                        "{}: {system} header, {} bytes",
                        report.file, report.header_length
                    );
                    match &report.stripped_to {
                        Some(target) => println!(", stripped to {target}"),
                        None => println!(),
                    }
                }
                None => println!("{}: no header", report.file),
            }
        }
        reports.push(report);
    }

    if mode.is_structured() {
        emit(mode, &reports)?;
    }
    Ok(0)
}

fn read_sample(file: &PathBuf) -> Result<Vec<u8>, StashError> {
    use std::io::Read;
    let mut handle = std::fs::File::open(file)?;
    let mut sample = vec![0u8; rom_stash_core::CHUNK_SIZE];
    let mut total = 0;
    loop {
        let n = handle.read(&mut sample[total..])?;
        if n == 0 {
            break;
        }
        total += n;
        if total == sample.len() {
            break;
        }
    }
    sample.truncate(total);
    Ok(sample)
}
