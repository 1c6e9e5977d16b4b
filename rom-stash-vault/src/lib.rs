pub mod index;
pub mod scan;
pub mod vault;

pub use index::{
    load_index, save_index, update_index, IndexEntry, IndexFormat, UpdateEvent,
};
pub use vault::{CopySummary, Grouping, Vault};
