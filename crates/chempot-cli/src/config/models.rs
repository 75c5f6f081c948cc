use chempot::analysis::{AnalysisConfig, ChemicalPotentials, Frame};
use chempot::core::models::Composition;
use indexmap::IndexMap;
use std::path::PathBuf;

/// A compound whose two stability boundaries become reservoirs.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryTarget {
    pub composition: Composition,
    /// Referenced potential of the one fixed element.
    pub fixed: ChemicalPotentials,
}

/// Fully resolved settings of `reservoirs build`.
#[derive(Debug)]
pub struct AppConfig {
    pub entries_path: PathBuf,
    pub output_path: PathBuf,
    /// Frame of the listed reservoirs and of the written file.
    pub frame: Frame,
    pub analysis: AnalysisConfig,
    pub reservoirs: IndexMap<String, ChemicalPotentials>,
    pub boundaries: Vec<BoundaryTarget>,
}
