use std::collections::BTreeMap;

use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::GeneratedGraph;
use graphgen_core::provenance::{GraphProvenance, SchemaVersion};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes the canonical structural hash of a generated graph.
///
/// Covers node count, direction, edges, memberships and weight bits; the
/// report is excluded so diagnostics never change the identity of a graph.
pub fn canonical_hash(graph: &GeneratedGraph) -> String {
    let mut hasher = Sha256::new();
    hasher.update(if graph.directed { b"directed" } else { b"undirect" });
    hasher.update((graph.num_nodes as u64).to_le_bytes());
    hasher.update((graph.edges.len() as u64).to_le_bytes());
    for [tail, head] in &graph.edges {
        hasher.update((*tail as u64).to_le_bytes());
        hasher.update((*head as u64).to_le_bytes());
    }
    for held in &graph.memberships {
        hasher.update((held.len() as u64).to_le_bytes());
        for community in held {
            hasher.update((*community as u64).to_le_bytes());
        }
    }
    match &graph.weights {
        Some(weights) => {
            hasher.update(b"weights:some");
            for weight in weights {
                hasher.update(weight.to_bits().to_le_bytes());
            }
        }
        None => hasher.update(b"weights:none"),
    }
    format!("{:x}", hasher.finalize())
}

/// Hashes the JSON encoding of a configuration.
pub fn config_hash<T: Serialize>(config: &T) -> Result<String, GraphGenError> {
    let bytes = serde_json::to_vec(config)
        .map_err(|err| GraphGenError::Serde(ErrorInfo::new("serialize-config", err.to_string())))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Builds the provenance record of `graph` generated from `config`.
pub fn provenance<T: Serialize>(
    graph: &GeneratedGraph,
    config: &T,
) -> Result<GraphProvenance, GraphGenError> {
    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    Ok(GraphProvenance {
        schema_version: SchemaVersion::default(),
        generator: graph.report.generator.clone(),
        config_hash: config_hash(config)?,
        graph_hash: canonical_hash(graph),
        seed: graph.report.seed,
        tool_versions,
    })
}
