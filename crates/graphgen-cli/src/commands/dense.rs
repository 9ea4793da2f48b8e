use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Args;
use graphgen_adapt::{dense_from_generated, DenseAdjacency};
use graphgen_core::GeneratedGraph;
use serde_json::Value;
use tracing::debug;

#[derive(Args, Debug)]
pub struct DenseArgs {
    /// Graph document written by a generating subcommand, or a bare graph.
    #[arg(long)]
    pub graph: PathBuf,
    /// Output CSV path; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Put heads on rows and tails on columns.
    #[arg(long)]
    pub transpose: bool,
}

pub fn run(args: &DenseArgs) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(&args.graph)?;
    let adjacency = dense_from_generated(&graph, args.transpose)?;
    debug!(nodes = graph.num_nodes, transpose = args.transpose, "dense adjacency built");
    match &args.out {
        Some(path) => write_csv(csv::Writer::from_path(path)?, &adjacency),
        None => write_csv(csv::Writer::from_writer(io::stdout()), &adjacency),
    }
}

/// Reads either a `{ provenance, graph }` document or a bare graph.
pub fn load_graph(path: &std::path::Path) -> Result<GeneratedGraph, Box<dyn Error>> {
    let mut value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let payload = if value.get("graph").is_some() {
        value["graph"].take()
    } else {
        value
    };
    Ok(serde_json::from_value(payload)?)
}

fn write_csv<W: io::Write>(
    mut writer: csv::Writer<W>,
    adjacency: &DenseAdjacency,
) -> Result<(), Box<dyn Error>> {
    match adjacency {
        DenseAdjacency::Unweighted(matrix) => {
            for row in 0..matrix.nrows() {
                writer.write_record((0..matrix.ncols()).map(|col| matrix[(row, col)].to_string()))?;
            }
        }
        DenseAdjacency::Weighted(matrix) => {
            for row in 0..matrix.nrows() {
                writer.write_record((0..matrix.ncols()).map(|col| matrix[(row, col)].to_string()))?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
