#![deny(missing_docs)]
#![doc = include_str!("../docs/core-api.md")]

pub mod errors;
mod output;
pub mod powerlaw;
pub mod provenance;
pub mod rng;
pub mod topology;

pub use errors::{ErrorInfo, GraphGenError};
pub use output::{shares_community, ClusteringSummary, Edge, GeneratedGraph, GenerationReport};
pub use powerlaw::PowerLaw;
pub use provenance::{GraphProvenance, SchemaVersion};
pub use rng::RngHandle;
pub use topology::{DirectedTopology, UndirectedTopology};

/// Convenience alias used by every fallible graphgen operation.
pub type Result<T, E = GraphGenError> = std::result::Result<T, E>;
