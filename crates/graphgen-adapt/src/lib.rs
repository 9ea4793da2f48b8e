#![deny(missing_docs)]
#![doc = "Format adapters over the `GeneratedGraph` output contract: dense \
adjacency matrices and a labeled node/edge graph."]

/// Dense adjacency matrices backed by `nalgebra`.
pub mod dense;
/// Labeled node/edge graph carrying full membership sequences.
pub mod labeled;

pub use dense::{dense_from_generated, to_dense_unweighted, to_dense_weighted, DenseAdjacency};
pub use labeled::{LabeledEdge, LabeledGraph, LabeledNode};
