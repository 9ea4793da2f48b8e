//! Configuration documents and command-line overrides.

use std::error::Error;
use std::fs;
use std::path::Path;

use clap::Args;
use graphgen_core::errors::{ErrorInfo, GraphGenError};
use serde::de::DeserializeOwned;

/// Overrides applied on top of a loaded configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Replace the seed from the configuration file.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Replace the node count from the configuration file.
    #[arg(long = "num-nodes")]
    pub num_nodes: Option<usize>,
}

impl Overrides {
    /// Writes the present overrides into the given fields.
    pub fn apply(&self, seed: &mut u64, num_nodes: &mut usize) {
        if let Some(value) = self.seed {
            *seed = value;
        }
        if let Some(value) = self.num_nodes {
            *num_nodes = value;
        }
    }
}

/// Loads a YAML (`.yaml`, `.yml`) or JSON (`.json`) document.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&contents)?),
        Some("json") => Ok(serde_json::from_str(&contents)?),
        _ => Err(Box::new(GraphGenError::Configuration(
            ErrorInfo::new("config-format", "configuration must be a .yaml, .yml or .json file")
                .with_context("path", path.display()),
        ))),
    }
}
