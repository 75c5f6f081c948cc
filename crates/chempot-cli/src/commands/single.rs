use crate::cli::SingleArgs;
use crate::commands::{analysis_config, load_phase_diagram};
use crate::display;
use crate::error::{CliError, Result};
use chempot::analysis::{ChemicalPotentials, ChempotAnalysis};
use chempot::core::models::Element;
use tracing::info;

pub fn run(args: SingleArgs) -> Result<()> {
    let fixed = fixed_chempots(&args.fixed)?;
    let config = analysis_config(&args.entries, None)?;
    let pd = load_phase_diagram(&args.entries.entries, config.stability_tolerance)?;
    let analysis = ChempotAnalysis::with_config(pd, config);

    let mu = analysis.single_chempot(&args.composition, &fixed)?;
    let free = args
        .composition
        .elements()
        .find(|e| !fixed.contains(*e))
        .ok_or_else(|| CliError::Argument("every element is fixed".to_string()))?;
    info!("Δμ({}) = {:.6} eV for {}.", free, mu, args.composition);

    let mut result = fixed;
    result.insert(free, mu);
    let title = format!(
        "Referenced Chemical Potentials for {}",
        args.composition.reduced_formula()
    );
    display::print_chempots(&title, &result);
    Ok(())
}

/// Collects repeated `--fixed` values, rejecting an element given twice.
pub(crate) fn fixed_chempots(pairs: &[(Element, f64)]) -> Result<ChemicalPotentials> {
    let mut fixed = ChemicalPotentials::new();
    for (element, mu) in pairs {
        if fixed.insert(*element, *mu).is_some() {
            return Err(CliError::Argument(format!(
                "chemical potential of {} given more than once",
                element
            )));
        }
    }
    Ok(fixed)
}
