use crate::cli::ReferenceArgs;
use crate::commands::{analysis_config, load_phase_diagram};
use crate::display;
use crate::error::Result;
use chempot::analysis::PhaseDiagramHandler;

pub fn run(args: ReferenceArgs) -> Result<()> {
    let config = analysis_config(&args.entries, None)?;
    let pd = load_phase_diagram(&args.entries.entries, config.stability_tolerance)?;

    let reference = PhaseDiagramHandler::new(&pd).chempots_reference();
    display::print_chempots("Reference Chemical Potentials (eV/atom)", &reference);
    Ok(())
}
