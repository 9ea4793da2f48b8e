use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use graphgen_lfr::{provenance, unweighted_undirected, weighted_undirected, UndirectedConfig, WeightConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{write_json, GraphDocument};
use crate::input::{load_document, Overrides};

#[derive(Args, Debug)]
pub struct LfrArgs {
    /// YAML or JSON file holding the LFR parameters.
    #[arg(long)]
    pub config: PathBuf,
    /// Output path for the graph document; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub overrides: Overrides,
}

/// Undirected LFR parameters with an optional `weights` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LfrFile {
    #[serde(flatten)]
    pub graph: UndirectedConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightConfig>,
}

pub fn run(args: &LfrArgs) -> Result<(), Box<dyn Error>> {
    let mut file: LfrFile = load_document(&args.config)?;
    let lfr = &mut file.graph.lfr;
    args.overrides.apply(&mut lfr.seed, &mut lfr.num_nodes);
    file.graph.validate()?;

    let graph = match &file.weights {
        Some(weights) => {
            weights.validate()?;
            weighted_undirected(&file.graph, weights)?
        }
        None => unweighted_undirected(&file.graph)?,
    };
    let provenance = provenance(&graph, &file)?;
    info!(
        edges = graph.num_edges(),
        graph_hash = %provenance.graph_hash,
        "lfr graph ready"
    );
    write_json(
        args.out.as_deref(),
        &GraphDocument {
            provenance,
            graph: &graph,
        },
    )
}
