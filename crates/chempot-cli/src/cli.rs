use crate::utils::parser::parse_chempot;
use chempot::analysis::Frame;
use chempot::core::models::{Composition, Element};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Chempot Developers",
    version,
    about = "chempot - chemical potentials, stability boundaries and reservoirs from convex-hull phase diagrams.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the phase diagram and list every entry with its stability.
    Hull(HullArgs),
    /// Print the reference chemical potentials (energy per atom of the elemental phases).
    Reference(ReferenceArgs),
    /// Solve for the one unknown chemical potential of a stable compound.
    Single(SingleArgs),
    /// Find the two-phase boundaries around a compound of a ternary system.
    Boundary(BoundaryArgs),
    /// Build, convert and inspect reservoir files.
    Reservoirs(ReservoirsArgs),
}

/// Source of the phase diagram entries.
#[derive(Args, Debug, Clone)]
pub struct EntriesArgs {
    /// Entries file: CSV with `name,formula,energy`, or a JSON array of entries.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub entries: PathBuf,

    /// Energy tolerance (eV/atom) for stability decisions.
    #[arg(long, value_name = "FLOAT")]
    pub stability_tolerance: Option<f64>,
}

#[derive(Args, Debug)]
pub struct HullArgs {
    #[command(flatten)]
    pub entries: EntriesArgs,

    /// Only list stable entries.
    #[arg(long)]
    pub stable_only: bool,
}

#[derive(Args, Debug)]
pub struct ReferenceArgs {
    #[command(flatten)]
    pub entries: EntriesArgs,
}

#[derive(Args, Debug)]
pub struct SingleArgs {
    #[command(flatten)]
    pub entries: EntriesArgs,

    /// Composition of the stable compound (e.g., NaNbO3).
    #[arg(short, long, required = true, value_name = "FORMULA")]
    pub composition: Composition,

    /// Fixed referenced chemical potential, as `El=value`. Repeat for every
    /// element of the compound but one.
    #[arg(long = "fixed", value_name = "EL=MU", value_parser = parse_chempot, required = true)]
    pub fixed: Vec<(Element, f64)>,
}

#[derive(Args, Debug)]
pub struct BoundaryArgs {
    #[command(flatten)]
    pub entries: EntriesArgs,

    /// Composition of the compound whose stability boundaries are wanted.
    #[arg(short, long, required = true, value_name = "FORMULA")]
    pub composition: Composition,

    /// The fixed referenced chemical potential, as `El=value`.
    #[arg(long = "fixed", value_name = "EL=MU", value_parser = parse_chempot, required = true)]
    pub fixed: (Element, f64),

    /// Override the singular-matrix tolerance of the boundary solve.
    #[arg(long, value_name = "FLOAT")]
    pub singular_tolerance: Option<f64>,

    /// Save the two boundary reservoirs as a reservoirs JSON file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReservoirsArgs {
    #[command(subcommand)]
    pub command: ReservoirsCommands,
}

#[derive(Subcommand, Debug)]
pub enum ReservoirsCommands {
    /// Build a reservoirs file from a TOML configuration and an entries file.
    Build(BuildArgs),
    /// Convert a reservoirs file to absolute or referenced chemical potentials.
    Convert(ConvertArgs),
    /// Print a reservoirs file as a table.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the reservoirs configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the output reservoirs JSON file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Override the entries file named in the configuration.
    #[arg(short, long, value_name = "PATH")]
    pub entries: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S analysis.stability-tolerance=1e-6
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input reservoirs JSON file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Target frame of the chemical potentials.
    #[arg(long, required = true, value_enum)]
    pub to: FrameArg,

    /// Output file; the input is overwritten when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Input reservoirs JSON file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Render reservoir names as Latex compositions.
    #[arg(long)]
    pub latex: bool,

    /// With --latex, put the whole label in math mode.
    #[arg(long, requires = "latex")]
    pub all_math: bool,

    /// Show the chemical potentials in this frame instead of the stored one.
    #[arg(long, value_enum)]
    pub frame: Option<FrameArg>,

    /// Also write the table as CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameArg {
    Absolute,
    Referenced,
}

impl From<FrameArg> for Frame {
    fn from(arg: FrameArg) -> Self {
        match arg {
            FrameArg::Absolute => Frame::Absolute,
            FrameArg::Referenced => Frame::Referenced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(s: &str) -> Element {
        s.parse().unwrap()
    }

    #[test]
    fn single_collects_repeated_fixed_values() {
        let cli = Cli::parse_from([
            "chempot", "single", "-e", "entries.csv", "-c", "NaNbO3", "--fixed", "Na=-1.5",
            "--fixed", "O=-2",
        ]);
        let Commands::Single(args) = cli.command else {
            panic!("expected the single subcommand");
        };
        assert_eq!(args.composition, "NaNbO3".parse::<Composition>().unwrap());
        assert_eq!(args.fixed, vec![(el("Na"), -1.5), (el("O"), -2.0)]);
    }

    #[test]
    fn boundary_takes_exactly_one_fixed_value() {
        let cli = Cli::parse_from([
            "chempot", "boundary", "-e", "e.csv", "-c", "NaNbO3", "--fixed", "O=-1",
        ]);
        let Commands::Boundary(args) = cli.command else {
            panic!("expected the boundary subcommand");
        };
        assert_eq!(args.fixed, (el("O"), -1.0));

        let twice = Cli::try_parse_from([
            "chempot", "boundary", "-e", "e.csv", "-c", "NaNbO3", "--fixed", "O=-1", "--fixed",
            "Na=0",
        ]);
        assert!(twice.is_err());
    }

    #[test]
    fn malformed_fixed_values_are_rejected_at_parse_time() {
        for bad in ["O", "Xx=1", "O=abc"] {
            let result = Cli::try_parse_from([
                "chempot", "single", "-e", "e.csv", "-c", "Na2O", "--fixed", bad,
            ]);
            assert!(result.is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn global_flags_work_after_subcommands() {
        let cli = Cli::parse_from([
            "chempot", "reservoirs", "convert", "-i", "in.json", "--to", "absolute", "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Reservoirs(ReservoirsArgs {
            command: ReservoirsCommands::Convert(args),
        }) = cli.command
        else {
            panic!("expected reservoirs convert");
        };
        assert_eq!(args.to, FrameArg::Absolute);
        assert!(args.output.is_none());
    }

    #[test]
    fn all_math_requires_latex() {
        let result = Cli::try_parse_from(["chempot", "reservoirs", "show", "-i", "r.json", "--all-math"]);
        assert!(result.is_err());
    }
}
