//! rom-stash CLI
//!
//! Command-line interface for managing a ROM vault: checking and
//! validating against DAT catalogs, renaming, rebuilding, repacking and
//! maintaining persistent indexes.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use output::OutputMode;

#[derive(Parser)]
#[command(name = "rom-stash")]
#[command(about = "Manage a vault of ROMs against DAT catalogs", long_about = None)]
struct Cli {
    /// Output mode
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputMode,

    /// Overwrite existing targets
    #[arg(long, global = true)]
    force: bool,

    /// Print per-item detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Archive path separator (single char, or a two-char bracket pair)
    #[arg(long, global = true)]
    separator: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a directory against a DAT: missing, extra, included
    Check {
        /// DAT catalog file
        dat: PathBuf,
        /// ROM directory
        dir: PathBuf,
    },

    /// Validate names and locations of every cataloged ROM
    Validate {
        dat: PathBuf,
        dir: PathBuf,
        /// Directory names accepted as valid root storage
        #[arg(long, value_delimiter = ',')]
        roots: Vec<String>,
    },

    /// Save, load or refresh a persistent vault index
    Index {
        #[command(subcommand)]
        action: commands::index::IndexAction,
    },

    /// Rename ROMs to their cataloged names
    Rename {
        dat: PathBuf,
        dir: PathBuf,
    },

    /// Build per-game archives from vault content
    Rebuild {
        dat: PathBuf,
        /// Source ROM directory
        dir: PathBuf,
        /// Output directory
        dest: PathBuf,
        /// Target archive format
        #[arg(long, default_value = "zip")]
        to: String,
    },

    /// Re-encode archives into another container format
    Repack {
        files: Vec<PathBuf>,
        /// Target archive format
        #[arg(long)]
        to: String,
        /// Plan only, no filesystem changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Inspect (and optionally strip) embedded ROM headers
    Header {
        files: Vec<PathBuf>,
        /// Write a headerless copy next to each headered file
        #[arg(long)]
        strip: bool,
    },

    /// Delete vault content the catalog does not know
    Clean {
        dat: PathBuf,
        dir: PathBuf,
        /// Copy extras here before deleting them
        #[arg(long)]
        trash: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(separator) = &cli.separator {
        rom_stash_core::set_archive_separator(separator.clone());
    }
    register_providers();

    let result = match &cli.command {
        Commands::Check { dat, dir } => commands::check::run(dat, dir, cli.format, cli.verbose),
        Commands::Validate { dat, dir, roots } => {
            commands::validate::run(dat, dir, roots, cli.format, cli.verbose)
        }
        Commands::Index { action } => commands::index::run(action, cli.format, cli.verbose),
        Commands::Rename { dat, dir } => {
            commands::rename::run(dat, dir, cli.force, cli.format, cli.verbose)
        }
        Commands::Rebuild { dat, dir, dest, to } => {
            commands::rebuild::run(dat, dir, dest, to, cli.format)
        }
        Commands::Repack { files, to, dry_run } => {
            commands::repack::run(files, to, *dry_run, cli.format)
        }
        Commands::Header { files, strip } => {
            commands::header::run(files, *strip, cli.format, cli.force)
        }
        Commands::Clean { dat, dir, trash } => {
            commands::clean::run(dat, dir, trash.as_deref(), cli.format)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!(
                "{} {err}",
                "error:".if_supports_color(Stderr, |t| t.red())
            );
            ExitCode::from(2)
        }
    }
}

/// Register every archive provider the process will use.
fn register_providers() {
    // The in-process zip provider is part of the registry defaults; 7z is
    // driven through its command-line tool.
    if let Some(sevenzip) =
        rom_stash_archive::ToolProvider::new(rom_stash_archive::sevenzip_spec())
    {
        rom_stash_archive::register(Arc::new(sevenzip));
    }
}
