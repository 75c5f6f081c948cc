use crate::cli::HullArgs;
use crate::commands::{analysis_config, load_phase_diagram};
use crate::display;
use crate::error::Result;
use tracing::info;

pub fn run(args: HullArgs) -> Result<()> {
    let config = analysis_config(&args.entries, None)?;
    let pd = load_phase_diagram(&args.entries.entries, config.stability_tolerance)?;

    info!("Listing {} entries.", pd.all_entries().len());
    display::print_hull(&pd, args.stable_only);
    Ok(())
}
