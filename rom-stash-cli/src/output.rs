//! Output plumbing shared by the commands.

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use rom_stash_core::StashError;

/// How results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Plain lines
    Text,
    /// Progress bars and colors
    Fancy,
    /// One JSON document
    Json,
    /// One YAML document
    Yaml,
}

impl OutputMode {
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputMode::Json | OutputMode::Yaml)
    }

    pub fn is_fancy(&self) -> bool {
        matches!(self, OutputMode::Fancy)
    }
}

/// Serialize a report to stdout in the structured mode.
pub fn emit<T: Serialize>(mode: OutputMode, report: &T) -> Result<(), StashError> {
    match mode {
        OutputMode::Json => {
            let text = serde_json::to_string_pretty(report)
                .map_err(|e| StashError::processing(format!("cannot render JSON: {e}")))?;
            println!("{text}");
        }
        OutputMode::Yaml => {
            let text = serde_yml::to_string(report)
                .map_err(|e| StashError::processing(format!("cannot render YAML: {e}")))?;
            print!("{text}");
        }
        OutputMode::Text | OutputMode::Fancy => {}
    }
    Ok(())
}

/// A progress bar over `len` items, visible only in fancy mode.
pub fn progress_bar(mode: OutputMode, len: u64, message: &'static str) -> ProgressBar {
    if !mode.is_fancy() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{msg:>12} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("static template")
            .progress_chars("=> "),
    );
    bar.set_message(message);
    bar
}

/// An indeterminate spinner, visible only in fancy mode.
pub fn spinner(mode: OutputMode, message: &'static str) -> ProgressBar {
    if !mode.is_fancy() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}
