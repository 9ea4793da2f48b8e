use serde::{Deserialize, Serialize};

/// Edge as `[tail, head]`; undirected edges are stored with `tail < head`.
pub type Edge = [usize; 2];

/// Result of the clustering rewiring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringSummary {
    /// Requested average clustering coefficient.
    pub target: f64,
    /// Average clustering coefficient before rewiring.
    pub initial: f64,
    /// Average clustering coefficient of the returned graph.
    pub achieved: f64,
    /// Number of swap attempts performed.
    pub attempts: usize,
    /// Number of swaps kept.
    pub accepted: usize,
}

/// Diagnostics describing how closely a generated graph met its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerationReport {
    /// Generator family that produced the graph.
    pub generator: String,
    /// Seed of the RNG stream.
    pub seed: u64,
    /// Fraction of edges whose endpoints share no community.
    pub realized_mixing: f64,
    /// Stubs that could not be matched and were dropped.
    pub stubs_dropped: usize,
    /// Stubs created beyond the sampled degrees.
    pub stubs_added: usize,
    /// Internal stubs wired through the external pool because their
    /// community could not host them.
    #[serde(default)]
    pub stubs_rerouted: usize,
    /// Outcome of the clustering pass, when one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clustering: Option<ClusteringSummary>,
    /// Largest relative deviation of a node's strength split after weight fitting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_fit_error: Option<f64>,
}

/// Output contract shared by every generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedGraph {
    /// Number of nodes; ids are `0..num_nodes`.
    pub num_nodes: usize,
    /// Whether `edges` are arcs (`tail -> head`).
    pub directed: bool,
    /// Edge list sorted by tail, then head.
    pub edges: Vec<Edge>,
    /// Community ids per node, primary community first.
    pub memberships: Vec<Vec<usize>>,
    /// Edge weights aligned index-for-index with `edges`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weights: Option<Vec<f64>>,
    /// Generation diagnostics.
    pub report: GenerationReport,
}

impl GeneratedGraph {
    /// Number of edges (or arcs).
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether edge weights are attached.
    pub fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }

    /// Number of distinct communities referenced by the memberships.
    pub fn num_communities(&self) -> usize {
        self.memberships
            .iter()
            .flatten()
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Member lists per community id.
    pub fn community_members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.num_communities()];
        for (node, communities) in self.memberships.iter().enumerate() {
            for &community in communities {
                members[community].push(node);
            }
        }
        members
    }

    /// Total degree (in plus out for directed graphs) of every node.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_nodes];
        for &[tail, head] in &self.edges {
            degrees[tail] += 1;
            degrees[head] += 1;
        }
        degrees
    }

    /// Returns whether the endpoints of `edge` share at least one community.
    pub fn is_internal(&self, edge: Edge) -> bool {
        shares_community(&self.memberships[edge[0]], &self.memberships[edge[1]])
    }

    /// Fraction of edges whose endpoints belong to different primary communities.
    pub fn primary_mixing(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        let crossing = self
            .edges
            .iter()
            .filter(|[tail, head]| self.memberships[*tail][0] != self.memberships[*head][0])
            .count();
        crossing as f64 / self.edges.len() as f64
    }
}

/// Returns whether two membership lists intersect.
pub fn shares_community(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|community| b.contains(community))
}
