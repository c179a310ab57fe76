use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use volsim_prop::Property;

#[derive(Args, Debug)]
pub struct PropertyArgs {
    /// A persisted `Random Property <name>.json` file.
    #[arg(long)]
    pub file: PathBuf,
}

pub fn run(args: &PropertyArgs) -> Result<(), Box<dyn Error>> {
    let property = Property::from_json_file(&args.file)?;
    println!("{property}");
    Ok(())
}
