//! # Analysis Module
//!
//! Chemical-potential algorithms on top of a [`PhaseDiagram`](crate::core::hull::PhaseDiagram).
//!
//! [`PhaseDiagramHandler`] answers read-only questions (reference potentials, entries
//! and formation energies of a composition). [`ChempotAnalysis`] converts potentials
//! between the absolute and referenced frames, solves for a single unknown potential
//! and locates the two-phase boundaries around a compound in a ternary system.

pub mod chempots;
pub mod config;
pub mod error;
pub mod handler;

pub use chempots::{ChemicalPotentials, ChempotAnalysis, Frame};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigError};
pub use error::AnalysisError;
pub use handler::PhaseDiagramHandler;
