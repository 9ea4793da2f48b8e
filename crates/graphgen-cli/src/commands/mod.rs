pub mod dense;
pub mod klemm;
pub mod lfr;
pub mod lfr_directed;

use std::error::Error;
use std::fs;
use std::path::Path;

use graphgen_core::{GeneratedGraph, GraphProvenance};
use serde::Serialize;

/// Document written by the generating subcommands.
#[derive(Debug, Serialize)]
pub struct GraphDocument<'a> {
    pub provenance: GraphProvenance,
    pub graph: &'a GeneratedGraph,
}

/// Writes pretty JSON to `out`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(out: Option<&Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
