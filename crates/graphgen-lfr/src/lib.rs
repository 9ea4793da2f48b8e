#![deny(missing_docs)]
#![doc = include_str!("../docs/lfr-api.md")]

//! Deterministic LFR benchmark generators with planted, optionally overlapping, communities.

pub mod assignment;
pub mod budget;
pub mod clustering;
pub mod communities;
mod config;
pub mod degrees;
pub mod directed;
mod generators;
mod hash;
mod serialization;
pub mod weights;
pub mod wiring;

pub use config::{DirectedConfig, LfrConfig, RoundingPolicy, UndirectedConfig, WeightConfig};
pub use generators::{
    mixing_fraction, unweighted_directed, unweighted_undirected, weighted_directed,
    weighted_undirected,
};
pub use hash::{canonical_hash, config_hash, provenance};
pub use weights::{assign_weights, WeightOutcome};

/// Re-export serialization helpers for downstream crates.
pub use serialization::{graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json};
