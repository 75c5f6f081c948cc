//! # Reservoirs Module
//!
//! The user-facing collection of named chemical-potential sets ("reservoirs"), each
//! describing the growth or equilibrium conditions of a compound. A [`Reservoirs`]
//! value owns the sets, shares the phase diagram they refer to and records whether
//! they are absolute or referenced. It converts between the two frames in bulk,
//! exports a [`Table`], and persists to a self-contained JSON document.

pub mod collection;
pub mod document;
pub mod error;
pub mod table;

pub use collection::Reservoirs;
pub use document::ReservoirsDocument;
pub use error::ReservoirError;
pub use table::{Table, TableOptions, TableRow};
