//! # Models Module
//!
//! Stateless chemical data types shared by every other layer of the crate.
//!
//! - [`element`] - Periodic-table species with static mass and electronegativity data
//! - [`composition`] - Element-to-amount maps, formula parsing and reduction
//! - [`entry`] - Compositions paired with computed total energies

pub mod composition;
pub mod element;
pub mod entry;

pub use composition::{AMOUNT_TOLERANCE, Composition, CompositionError};
pub use element::{Element, UnknownElementError};
pub use entry::PdEntry;
