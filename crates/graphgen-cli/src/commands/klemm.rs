use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use graphgen_core::{GeneratedGraph, GraphProvenance};
use graphgen_klemm::{klemm_graph, KlemmConfig};
use graphgen_lfr::provenance;
use serde::Serialize;
use tracing::info;

use super::write_json;
use crate::input::{load_document, Overrides};

#[derive(Args, Debug)]
pub struct KlemmArgs {
    /// YAML or JSON file holding the growth parameters.
    #[arg(long)]
    pub config: PathBuf,
    /// Output path for the graph document; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Serialize)]
struct KlemmDocument<'a> {
    provenance: GraphProvenance,
    graph: &'a GeneratedGraph,
    cliques: &'a [Vec<usize>],
    peak_active: usize,
}

pub fn run(args: &KlemmArgs) -> Result<(), Box<dyn Error>> {
    let mut config: KlemmConfig = load_document(&args.config)?;
    args.overrides.apply(&mut config.seed, &mut config.num_nodes);
    config.validate()?;

    let outcome = klemm_graph(&config)?;
    let provenance = provenance(&outcome.graph, &config)?;
    info!(
        cliques = outcome.cliques.len(),
        peak_active = outcome.peak_active,
        "klemm graph ready"
    );
    write_json(
        args.out.as_deref(),
        &KlemmDocument {
            provenance,
            graph: &outcome.graph,
            cliques: &outcome.cliques,
            peak_active: outcome.peak_active,
        },
    )
}
