use crate::core::hull::HullError;
use crate::core::models::Element;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No entry found for composition {0}")]
    NotFound(String),

    #[error("No stable entry found for composition {0}")]
    StableNotFound(String),

    #[error("No stable phase on the {side} side of {composition} at the given chemical potential")]
    BoundaryNotFound {
        composition: String,
        side: &'static str,
    },

    #[error("{count} distinct candidates match {composition}; refusing to pick one")]
    AmbiguousMatch { composition: String, count: usize },

    #[error("Composition {composition} is not stable at chemical potentials {chempots}")]
    NotStable {
        composition: String,
        chempots: String,
    },

    #[error("Operation requires a {expected}-element phase diagram, found {found} elements")]
    UnsupportedArity { expected: usize, found: usize },

    #[error("Singular linear system while solving {0}")]
    SingularSystem(String),

    #[error("Invalid chemical-potential constraint: {0}")]
    InvalidConstraint(String),

    #[error("Element {0} has no reference chemical potential in the phase diagram")]
    UnknownElement(Element),

    #[error("Phase diagram error: {source}")]
    Hull {
        #[from]
        source: HullError,
    },
}
