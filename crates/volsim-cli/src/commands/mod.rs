pub mod export;
pub mod property;
pub mod run;

use std::error::Error;
use std::fs;
use std::path::Path;

use volsim_core::VolError;
use volsim_model::{receive, Model};

/// Reads a JSON model definition and rebuilds it through the import shim.
pub fn load_model(path: &Path) -> Result<Model, Box<dyn Error>> {
    let text = fs::read_to_string(path).map_err(|err| VolError::from_io("model-read", err, path))?;
    let definition: serde_json::Value = serde_json::from_str(&text)?;
    Ok(receive(definition)?)
}
