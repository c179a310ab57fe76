use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;
use volsim_model::{send, write_export, RunManifest, SimulationConfig};

use super::load_model;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the JSON model definition.
    #[arg(long)]
    pub model: PathBuf,
    /// Optional YAML or JSON run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for the export, manifest and serialized model.
    #[arg(long)]
    pub out: PathBuf,
    /// Master seed; takes precedence over the model and the config.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut model = load_model(&args.model)?;
    let config = match &args.config {
        Some(path) => {
            let config = SimulationConfig::load(path)?;
            model.apply_config(&config)?;
            config
        }
        None => SimulationConfig {
            num_samples: model.num_samples(),
            ..SimulationConfig::default()
        },
    };
    if let Some(seed) = args.seed {
        model.set_seed(Some(seed));
    }

    model.run()?;
    let export = send(&model)?;

    fs::create_dir_all(&args.out)?;
    let export_path = args.out.join(&config.output.export_file);
    write_export(&export, &export_path)?;
    model.to_json_file(args.out.join(&config.output.model_file))?;

    let manifest = RunManifest::for_run(&model, &config)?;
    manifest.write(&args.out.join(&config.output.manifest_file))?;

    info!(
        model = %model.name(),
        out = %args.out.display(),
        "run complete"
    );
    println!("{}", export_path.display());
    Ok(())
}
