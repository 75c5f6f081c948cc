use crate::cli::BoundaryArgs;
use crate::commands::{analysis_config, load_phase_diagram};
use crate::display;
use crate::error::Result;
use chempot::analysis::{ChemicalPotentials, ChempotAnalysis, Frame};
use chempot::reservoirs::{Reservoirs, Table, TableOptions};
use std::sync::Arc;
use tracing::info;

pub fn run(args: BoundaryArgs) -> Result<()> {
    let (element, mu) = args.fixed;
    let fixed: ChemicalPotentials = [(element, mu)].into_iter().collect();

    let config = analysis_config(&args.entries, args.singular_tolerance)?;
    let pd = load_phase_diagram(&args.entries.entries, config.stability_tolerance)?;
    let analysis = ChempotAnalysis::with_config(Arc::clone(&pd), config);

    let boundaries = analysis.boundary_analysis(&args.composition, &fixed)?;

    let table = Table::from_reservoirs(
        boundaries.iter().map(|(name, mu)| (name.as_str(), mu)),
        &TableOptions::default(),
    );
    display::print_table(
        &format!(
            "Boundaries of {} at Δμ({}) = {} eV",
            args.composition.reduced_formula(),
            element,
            mu
        ),
        &table,
    );

    if let Some(output) = &args.output {
        let reservoirs = Reservoirs::new(boundaries, pd, Frame::Referenced);
        reservoirs.to_json_file(output)?;
        info!("Boundary reservoirs written to {:?}", output);
        println!("✓ Boundary reservoirs written to: {}", output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::EntriesArgs;
    use crate::commands::fixtures;
    use crate::error::CliError;
    use tempfile::tempdir;

    fn args(dir: &tempfile::TempDir, composition: &str) -> BoundaryArgs {
        BoundaryArgs {
            entries: EntriesArgs {
                entries: fixtures::write_entries(dir),
                stability_tolerance: None,
            },
            composition: composition.parse().unwrap(),
            fixed: ("O".parse().unwrap(), -1.0),
            singular_tolerance: None,
            output: None,
        }
    }

    #[test]
    fn run_writes_boundary_reservoirs() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("boundaries.json");
        let mut args = args(&dir, "NaNbO3");
        args.output = Some(output.clone());
        run(args).unwrap();

        let reservoirs = Reservoirs::from_json_file(&output).unwrap();
        assert_eq!(
            reservoirs.names().collect::<Vec<_>>(),
            vec!["NbO2-NaNbO3", "NaNbO3-Na2O"]
        );
        assert_eq!(reservoirs.frame(), Frame::Referenced);
    }

    #[test]
    fn run_fails_without_a_right_neighbor() {
        let dir = tempdir().unwrap();
        assert!(matches!(run(args(&dir, "Na2O")), Err(CliError::Analysis(_))));
    }
}
