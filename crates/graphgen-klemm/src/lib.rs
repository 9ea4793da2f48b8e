#![deny(missing_docs)]
#![doc = include_str!("../docs/klemm-api.md")]

mod config;
mod model;

pub use config::KlemmConfig;
pub use model::{klemm_graph, KlemmOutcome};
