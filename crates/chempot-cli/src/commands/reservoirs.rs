use crate::cli::{BuildArgs, ConvertArgs, ReservoirsArgs, ReservoirsCommands, ShowArgs};
use crate::commands::load_phase_diagram;
use crate::config::{AppConfig, build_config};
use crate::display;
use crate::error::{CliError, Result};
use chempot::analysis::{ChempotAnalysis, Frame};
use chempot::reservoirs::{Reservoirs, TableOptions};
use std::sync::Arc;
use tracing::{info, warn};

pub fn run(args: ReservoirsArgs) -> Result<()> {
    match args.command {
        ReservoirsCommands::Build(args) => build(args),
        ReservoirsCommands::Convert(args) => convert(args),
        ReservoirsCommands::Show(args) => show(args),
    }
}

fn build(args: BuildArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args)?;
    let output = config.output_path.clone();

    let reservoirs = build_reservoirs(config)?;
    reservoirs.to_json_file(&output)?;

    display::print_table(&title(&reservoirs), &reservoirs.table(&TableOptions::default()));
    println!(
        "✓ {} reservoirs written to: {}",
        reservoirs.len(),
        output.display()
    );
    Ok(())
}

/// Listed reservoirs first, then the two boundary reservoirs of every listed compound.
pub(crate) fn build_reservoirs(config: AppConfig) -> Result<Reservoirs> {
    let pd = load_phase_diagram(&config.entries_path, config.analysis.stability_tolerance)?;
    let analysis = ChempotAnalysis::with_config(Arc::clone(&pd), config.analysis);

    for (name, chempots) in &config.reservoirs {
        if let Some(element) = chempots
            .elements()
            .find(|e| !analysis.reference().contains(*e))
        {
            return Err(CliError::Config(format!(
                "Reservoir '{}' sets a potential for {}, which is not in the phase diagram.",
                name, element
            )));
        }
    }

    let mut reservoirs = Reservoirs::new(config.reservoirs, pd, config.frame);
    for boundary in &config.boundaries {
        info!(
            "Computing the boundaries of {} at {}.",
            boundary.composition, boundary.fixed
        );
        let found = analysis.boundary_analysis(&boundary.composition, &boundary.fixed)?;
        for (name, delta) in found {
            let chempots = match config.frame {
                Frame::Referenced => delta,
                Frame::Absolute => analysis.to_absolute(&delta)?,
            };
            if reservoirs.insert(name.clone(), chempots).is_some() {
                warn!("Boundary reservoir '{}' replaces an earlier one.", name);
            }
        }
    }
    info!(
        "Built {} reservoirs in the {} frame.",
        reservoirs.len(),
        reservoirs.frame()
    );
    Ok(reservoirs)
}

fn convert(args: ConvertArgs) -> Result<()> {
    let mut reservoirs = Reservoirs::from_json_file(&args.input)?;
    let target = Frame::from(args.to);
    if reservoirs.frame() == target {
        warn!(
            "Reservoirs in {:?} are already {}; writing them unchanged.",
            args.input, target
        );
    }
    reservoirs.ensure_frame(target)?;

    let output = args.output.as_ref().unwrap_or(&args.input);
    reservoirs.to_json_file(output)?;
    println!(
        "✓ {} reservoirs ({}) written to: {}",
        reservoirs.len(),
        target,
        output.display()
    );
    Ok(())
}

fn show(args: ShowArgs) -> Result<()> {
    let mut reservoirs = Reservoirs::from_json_file(&args.input)?;
    if let Some(frame) = args.frame {
        reservoirs.ensure_frame(frame.into())?;
    }

    let options = TableOptions {
        format_compositions: args.latex,
        all_math: args.all_math,
        ..TableOptions::default()
    };
    let table = reservoirs.table(&options);
    display::print_table(&title(&reservoirs), &table);

    if let Some(path) = &args.csv {
        table.write_csv(path)?;
        println!("✓ Table written to: {}", path.display());
    }
    Ok(())
}

fn title(reservoirs: &Reservoirs) -> String {
    format!(
        "{} reservoirs ({} chemical potentials, eV)",
        reservoirs.len(),
        reservoirs.frame()
    )
}
