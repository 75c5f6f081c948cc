//! # Core Module
//!
//! Stateless building blocks for convex-hull thermodynamics: chemical data types, the
//! phase-diagram provider, entry I/O and small numerical helpers.
//!
//! - **Chemical Data** ([`models`]) - Elements, compositions and energy entries
//! - **Convex Hulls** ([`hull`]) - Phase diagrams and their grand-potential projections
//! - **File I/O** ([`io`]) - Entry files and Latex formatting of composition labels
//! - **Numerics** ([`utils`]) - Dense linear solves with singularity detection
//!
//! Nothing in this layer knows about reservoirs or chemical-potential frames; it only
//! answers questions about energies and compositions.

pub mod hull;
pub mod io;
pub mod models;
pub mod utils;
