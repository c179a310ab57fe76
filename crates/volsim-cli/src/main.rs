use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    export::{self, ExportArgs},
    property::{self, PropertyArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "volsim", about = "Stochastic volumetrics model runner")]
struct Cli {
    /// Default log filter when RUST_LOG is unset (e.g. `debug`, `volsim_model=trace`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a model definition and write the export, manifest and model files.
    Run(RunArgs),
    /// Run a model definition and write only the export mapping.
    Export(ExportArgs),
    /// Print a persisted property.
    Property(PropertyArgs),
}

fn init_tracing(default_level: &str) -> Result<(), Box<dyn Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| err as Box<dyn Error>)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Export(args) => export::run(&args),
        Command::Property(args) => property::run(&args),
    }
}
