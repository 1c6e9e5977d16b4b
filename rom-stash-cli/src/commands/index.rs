use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

use rom_stash_core::StashError;
use rom_stash_vault::{load_index, save_index, update_index, IndexFormat, UpdateEvent};

use crate::commands::scan_vault;
use crate::output::{emit, OutputMode};

/// Default index file name inside a ROM directory.
const INDEX_FILE: &str = ".index";

#[derive(Debug, Subcommand)]
pub enum IndexAction {
    /// Scan a directory and write its index
    Save {
        dir: PathBuf,
        /// Index file (default: `<dir>/.index`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Serialize as JSON instead of YAML
        #[arg(long)]
        json: bool,
        /// Leading path components to strip from every key
        #[arg(long)]
        pathstrip: Option<usize>,
    },

    /// Load an index and report its state
    Load {
        index: PathBuf,
    },

    /// Reconcile an index with the filesystem
    Update {
        index: PathBuf,
        /// Also pick up files the index does not know yet
        #[arg(long)]
        add: bool,
        /// Serialize as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct LoadOutput {
    entries: usize,
    out_of_sync: Vec<String>,
}

#[derive(Serialize)]
struct UpdateOutput {
    changed: bool,
    added: Vec<String>,
    updated: Vec<String>,
    removed: Vec<String>,
}

pub fn run(action: &IndexAction, mode: OutputMode, verbose: bool) -> Result<u8, StashError> {
    match action {
        IndexAction::Save {
            dir,
            output,
            json,
            pathstrip,
        } => save(dir, output.as_deref(), *json, *pathstrip, mode, verbose),
        IndexAction::Load { index } => load(index, mode, verbose),
        IndexAction::Update { index, add, json } => update(index, *add, *json, mode),
    }
}

fn serialization(json: bool) -> IndexFormat {
    if json {
        IndexFormat::Json
    } else {
        IndexFormat::Yaml
    }
}

fn save(
    dir: &Path,
    output: Option<&Path>,
    json: bool,
    pathstrip: Option<usize>,
    mode: OutputMode,
    verbose: bool,
) -> Result<u8, StashError> {
    let vault = scan_vault(dir, mode)?;
    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(INDEX_FILE));
    // Saving inside the scanned directory keys entries relative to it.
    let strip = pathstrip.unwrap_or_else(|| {
        if target.parent() == Some(dir) {
            dir.components().count()
        } else {
            0
        }
    });

    let mut skipped = Vec::new();
    save_index(&vault, &target, serialization(json), strip, &mut |path| {
        skipped.push(path.to_string())
    })?;

    if !mode.is_structured() {
        println!("indexed {} ROMs into {}", vault.len(), target.display());
        if verbose {
            for path in &skipped {
                println!("  skipped {path}");
            }
        }
    }
    Ok(0)
}

fn load(index: &Path, mode: OutputMode, verbose: bool) -> Result<u8, StashError> {
    let mut out_of_sync = Vec::new();
    let vault = load_index(index, &mut |rom| {
        out_of_sync.push(rom.path().to_string());
        false
    })?;

    let output = LoadOutput {
        entries: vault.len(),
        out_of_sync,
    };

    if mode.is_structured() {
        emit(mode, &output)?;
    } else {
        println!(
            "{} entries in sync, {} out of sync",
            output.entries,
            output.out_of_sync.len()
        );
        if verbose {
            for path in &output.out_of_sync {
                println!("  out of sync: {path}");
            }
        }
    }
    Ok(if output.out_of_sync.is_empty() { 0 } else { 1 })
}

fn update(index: &Path, add: bool, json: bool, mode: OutputMode) -> Result<u8, StashError> {
    let mut output = UpdateOutput {
        changed: false,
        added: Vec::new(),
        updated: Vec::new(),
        removed: Vec::new(),
    };

    output.changed = update_index(index, add, serialization(json), &mut |event| {
        match event {
            UpdateEvent::Add(path) => output.added.push(path),
            UpdateEvent::Update(path) => output.updated.push(path),
            UpdateEvent::Remove(path) => output.removed.push(path),
        }
    })?;

    if mode.is_structured() {
        emit(mode, &output)?;
    } else {
        for path in &output.added {
            println!("ADD    {path}");
        }
        for path in &output.updated {
            println!("UPDATE {path}");
        }
        for path in &output.removed {
            println!("REMOVE {path}");
        }
        if !output.changed {
            println!("index is up to date");
        }
    }
    Ok(0)
}
