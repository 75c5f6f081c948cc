pub mod boundary;
pub mod hull;
pub mod reference;
pub mod reservoirs;
pub mod single;

use crate::cli::EntriesArgs;
use crate::error::Result;
use crate::utils::progress::with_spinner;
use chempot::analysis::{AnalysisConfig, AnalysisConfigBuilder};
use chempot::core::hull::PhaseDiagram;
use chempot::core::io::read_entries;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Tolerances from the command line, validated and filled from the defaults.
pub(crate) fn analysis_config(
    entries: &EntriesArgs,
    singular_tolerance: Option<f64>,
) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfigBuilder::new();
    if let Some(tolerance) = entries.stability_tolerance {
        builder = builder.stability_tolerance(tolerance);
    }
    if let Some(tolerance) = singular_tolerance {
        builder = builder.singular_tolerance(tolerance);
    }
    Ok(builder.build()?)
}

/// Reads an entries file and builds its phase diagram behind a spinner.
pub(crate) fn load_phase_diagram(path: &Path, tolerance: f64) -> Result<Arc<PhaseDiagram>> {
    info!("Loading entries from {:?}", path);
    let entries = read_entries(path)?;
    let count = entries.len();

    let pd = with_spinner(
        &format!("Building phase diagram from {} entries...", count),
        "Phase diagram ready",
        || PhaseDiagram::with_tolerance(entries, tolerance),
    )?;
    info!(
        "Phase diagram over {} elements: {} of {} entries stable.",
        pd.dim(),
        pd.stable_entries().count(),
        count
    );
    Ok(Arc::new(pd))
}
