//! Convex-hull thermodynamics over a set of computed entries.
//!
//! [`PhaseDiagram`] decides which entries lie on the lower convex hull of formation
//! energy per atom against composition, and [`GrandPotentialPhaseDiagram`] repeats the
//! construction with some chemical potentials held fixed.

mod error;
pub(crate) mod geometry;
pub mod grand;
pub mod phase_diagram;

pub use error::HullError;
pub use grand::GrandPotentialPhaseDiagram;
pub use phase_diagram::{DEFAULT_STABILITY_TOLERANCE, PhaseDiagram, PhaseDiagramDocument};
