pub mod check;
pub mod clean;
pub mod rebuild;
pub mod rename;
pub mod validate;

pub use check::{check, CheckReport};
pub use clean::{clean, CleanSummary};
pub use rebuild::{rebuild, RebuildSummary};
pub use rename::{rename_to_catalog, RenameSummary};
pub use validate::{validate, ValidateEvent, ValidateStats};
