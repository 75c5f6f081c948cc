//! # chempot Core Library
//!
//! Chemical-potential analysis over convex-hull phase diagrams built from computed
//! compound energies.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture with a strict dependency direction.
//!
//! - **[`core`]: The Foundation.** Stateless chemical data (`Element`, `Composition`,
//!   `PdEntry`), the convex-hull provider (`PhaseDiagram`, `GrandPotentialPhaseDiagram`),
//!   entry I/O and the small linear-algebra helpers everything else relies on.
//!
//! - **[`analysis`]: The Logic Core.** Read-only queries over a phase diagram
//!   (`PhaseDiagramHandler`) and the chemical-potential algorithms (`ChempotAnalysis`):
//!   conversion between absolute and referenced frames, single-potential solves and
//!   the boundary analysis of ternary systems.
//!
//! - **[`reservoirs`]: The Public API.** Named sets of chemical potentials sharing one
//!   phase diagram and one frame, with bulk frame conversion, tabular export and JSON
//!   persistence.

pub mod analysis;
pub mod core;
pub mod reservoirs;
