use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::{ClusteringSummary, GeneratedGraph, GenerationReport};
use graphgen_core::provenance::SchemaVersion;
use serde::{Deserialize, Serialize};

/// Serializes the graph to a compact binary representation using `bincode`.
pub fn graph_to_bytes(graph: &GeneratedGraph) -> Result<Vec<u8>, GraphGenError> {
    let serializable = SerializableGraph::from_graph(graph);
    bincode::serialize(&serializable)
        .map_err(|err| GraphGenError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a graph from its binary representation.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<GeneratedGraph, GraphGenError> {
    let serializable: SerializableGraph = bincode::deserialize(bytes).map_err(|err| {
        GraphGenError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string()))
    })?;
    serializable.into_graph()
}

/// Serializes the graph to a JSON string.
pub fn graph_to_json(graph: &GeneratedGraph) -> Result<String, GraphGenError> {
    let serializable = SerializableGraph::from_graph(graph);
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| GraphGenError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a graph from a JSON string.
pub fn graph_from_json(json: &str) -> Result<GeneratedGraph, GraphGenError> {
    let serializable: SerializableGraph = serde_json::from_str(json).map_err(|err| {
        GraphGenError::Serde(ErrorInfo::new("deserialize-json", err.to_string()))
    })?;
    serializable.into_graph()
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableGraph {
    schema_version: SchemaVersion,
    num_nodes: u64,
    directed: bool,
    edges: Vec<[u64; 2]>,
    memberships: Vec<Vec<u64>>,
    weights: Option<Vec<f64>>,
    report: SerializableReport,
}

impl SerializableGraph {
    fn from_graph(graph: &GeneratedGraph) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            num_nodes: graph.num_nodes as u64,
            directed: graph.directed,
            edges: graph
                .edges
                .iter()
                .map(|&[tail, head]| [tail as u64, head as u64])
                .collect(),
            memberships: graph
                .memberships
                .iter()
                .map(|held| held.iter().map(|&c| c as u64).collect())
                .collect(),
            weights: graph.weights.clone(),
            report: SerializableReport::from(&graph.report),
        }
    }

    fn into_graph(self) -> Result<GeneratedGraph, GraphGenError> {
        let num_nodes = self.num_nodes as usize;
        if self.memberships.len() != num_nodes {
            return Err(invalid_payload("membership list length differs from num_nodes")
                .with_context("memberships", self.memberships.len())
                .with_context("num_nodes", num_nodes));
        }
        if let Some(weights) = &self.weights {
            if weights.len() != self.edges.len() {
                return Err(invalid_payload("weight count differs from edge count")
                    .with_context("weights", weights.len())
                    .with_context("edges", self.edges.len()));
            }
        }
        let mut edges = Vec::with_capacity(self.edges.len());
        for [tail, head] in self.edges {
            if tail >= self.num_nodes || head >= self.num_nodes {
                return Err(invalid_payload("edge endpoint out of range")
                    .with_context("tail", tail)
                    .with_context("head", head));
            }
            edges.push([tail as usize, head as usize]);
        }
        Ok(GeneratedGraph {
            num_nodes,
            directed: self.directed,
            edges,
            memberships: self
                .memberships
                .into_iter()
                .map(|held| held.into_iter().map(|c| c as usize).collect())
                .collect(),
            weights: self.weights,
            report: self.report.into(),
        })
    }
}

fn invalid_payload(message: &str) -> GraphGenError {
    GraphGenError::Serde(ErrorInfo::new("invalid-payload", message))
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableReport {
    generator: String,
    seed: u64,
    realized_mixing: f64,
    stubs_dropped: u64,
    stubs_added: u64,
    stubs_rerouted: u64,
    clustering: Option<SerializableClustering>,
    weight_fit_error: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableClustering {
    target: f64,
    initial: f64,
    achieved: f64,
    attempts: u64,
    accepted: u64,
}

impl From<&GenerationReport> for SerializableReport {
    fn from(report: &GenerationReport) -> Self {
        Self {
            generator: report.generator.clone(),
            seed: report.seed,
            realized_mixing: report.realized_mixing,
            stubs_dropped: report.stubs_dropped as u64,
            stubs_added: report.stubs_added as u64,
            stubs_rerouted: report.stubs_rerouted as u64,
            clustering: report.clustering.as_ref().map(|summary| SerializableClustering {
                target: summary.target,
                initial: summary.initial,
                achieved: summary.achieved,
                attempts: summary.attempts as u64,
                accepted: summary.accepted as u64,
            }),
            weight_fit_error: report.weight_fit_error,
        }
    }
}

impl From<SerializableReport> for GenerationReport {
    fn from(report: SerializableReport) -> Self {
        Self {
            generator: report.generator,
            seed: report.seed,
            realized_mixing: report.realized_mixing,
            stubs_dropped: report.stubs_dropped as usize,
            stubs_added: report.stubs_added as usize,
            stubs_rerouted: report.stubs_rerouted as usize,
            clustering: report.clustering.map(|summary| ClusteringSummary {
                target: summary.target,
                initial: summary.initial,
                achieved: summary.achieved,
                attempts: summary.attempts as usize,
                accepted: summary.accepted as usize,
            }),
            weight_fit_error: report.weight_fit_error,
        }
    }
}
