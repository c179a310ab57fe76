use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use volsim_model::{send, write_export};

use super::load_model;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the JSON model definition.
    #[arg(long)]
    pub model: PathBuf,
    /// Destination file for the export mapping.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    let mut model = load_model(&args.model)?;
    model.run()?;
    let export = send(&model)?;
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_export(&export, &args.out)?;
    Ok(())
}
