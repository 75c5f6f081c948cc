//! Reading and writing entry files and formatting labels for reports.

pub mod entries;
pub mod format;

pub use entries::{EntryIoError, read_entries, write_entries_csv};
pub use format::format_composition;
