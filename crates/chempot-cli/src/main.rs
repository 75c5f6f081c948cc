mod cli;
mod commands;
mod config;
mod display;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("chempot CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Hull(args) => {
            info!("Dispatching to 'hull' command.");
            commands::hull::run(args)
        }
        Commands::Reference(args) => {
            info!("Dispatching to 'reference' command.");
            commands::reference::run(args)
        }
        Commands::Single(args) => {
            info!("Dispatching to 'single' command.");
            commands::single::run(args)
        }
        Commands::Boundary(args) => {
            info!("Dispatching to 'boundary' command.");
            commands::boundary::run(args)
        }
        Commands::Reservoirs(args) => {
            info!("Dispatching to 'reservoirs' command.");
            commands::reservoirs::run(args)
        }
    };

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
            println!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
            eprintln!("❌ Command failed: {}", e);
        }
    }

    command_result
}
