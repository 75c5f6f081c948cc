use crate::core::models::Element;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HullError {
    #[error("Cannot build a phase diagram without entries")]
    NoEntries,

    #[error("Entry '{0}' has an empty composition")]
    EmptyComposition(String),

    #[error("Entry '{name}' contains element {element}, which is not part of the diagram")]
    UnknownElement { name: String, element: Element },

    #[error("No elemental reference entry for {0}")]
    MissingTerminal(Element),

    #[error("Chemical potential for {element} is not finite: {value}")]
    NonFiniteChempot { element: Element, value: f64 },

    #[error("Every element of the diagram is fixed; no open elements remain")]
    NoOpenElements,

    #[error("Elemental references do not span the composition space")]
    DegenerateReferences,

    #[error("Composition {0} lies outside the convex hull of the stable entries")]
    OutsideHull(String),

    #[error("Invalid phase diagram document: {0}")]
    InvalidDocument(String),
}
