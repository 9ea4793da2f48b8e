use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_lfr::{provenance, unweighted_directed, weighted_directed, DirectedConfig, WeightConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{write_json, GraphDocument};
use crate::input::{load_document, Overrides};

#[derive(Args, Debug)]
pub struct LfrDirectedArgs {
    /// YAML or JSON file holding the LFR parameters.
    #[arg(long)]
    pub config: PathBuf,
    /// Output path for the graph document; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub overrides: Overrides,
}

/// Directed LFR parameters with an optional `weights` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LfrDirectedFile {
    #[serde(flatten)]
    pub graph: DirectedConfig,
    /// Only captured so it can be rejected.
    #[serde(default, skip_serializing)]
    pub avg_clustering: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightConfig>,
}

pub fn run(args: &LfrDirectedArgs) -> Result<(), Box<dyn Error>> {
    let mut file: LfrDirectedFile = load_document(&args.config)?;
    if let Some(target) = file.avg_clustering {
        return Err(Box::new(GraphGenError::Configuration(
            ErrorInfo::new(
                "directed-clustering",
                "avg_clustering is not supported for directed graphs",
            )
            .with_context("avg_clustering", target),
        )));
    }
    let lfr = &mut file.graph.lfr;
    args.overrides.apply(&mut lfr.seed, &mut lfr.num_nodes);
    file.graph.validate()?;

    let graph = match &file.weights {
        Some(weights) => {
            weights.validate()?;
            weighted_directed(&file.graph, weights)?
        }
        None => unweighted_directed(&file.graph)?,
    };
    let provenance = provenance(&graph, &file)?;
    info!(
        arcs = graph.num_edges(),
        graph_hash = %provenance.graph_hash,
        "directed lfr graph ready"
    );
    write_json(
        args.out.as_deref(),
        &GraphDocument {
            provenance,
            graph: &graph,
        },
    )
}
