use std::error::Error;

use clap::{Parser, Subcommand};
use graphgen_cli::commands::{
    dense::{self, DenseArgs},
    klemm::{self, KlemmArgs},
    lfr::{self, LfrArgs},
    lfr_directed::{self, LfrDirectedArgs},
};
use graphgen_cli::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "graphgen", about = "Community benchmark graph generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an undirected LFR graph, weighted when the file carries `weights`.
    Lfr(LfrArgs),
    /// Generate a directed LFR graph.
    LfrDirected(LfrDirectedArgs),
    /// Grow a Klemm clique graph.
    Klemm(KlemmArgs),
    /// Convert a generated graph document to a dense CSV adjacency matrix.
    Dense(DenseArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;
    let cli = Cli::parse();
    match cli.command {
        Command::Lfr(args) => lfr::run(&args),
        Command::LfrDirected(args) => lfr_directed::run(&args),
        Command::Klemm(args) => klemm::run(&args),
        Command::Dense(args) => dense::run(&args),
    }
}
