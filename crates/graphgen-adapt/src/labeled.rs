use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::GeneratedGraph;
use serde::{Deserialize, Serialize};

/// Node with its complete community sequence, primary first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledNode {
    /// Node id.
    pub id: usize,
    /// Every community the node belongs to.
    pub communities: Vec<usize>,
}

/// Edge with its optional weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledEdge {
    /// Tail (or lower endpoint for undirected graphs).
    pub source: usize,
    /// Head (or upper endpoint for undirected graphs).
    pub target: usize,
    /// Weight, when the graph is weighted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight: Option<f64>,
}

/// General-purpose node/edge view of a generated graph.
///
/// Overlapping nodes keep all of their memberships; there is no single-label
/// attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledGraph {
    /// Whether edges are directed.
    pub directed: bool,
    /// Nodes indexed by id.
    pub nodes: Vec<LabeledNode>,
    /// Edges in the generated order.
    pub edges: Vec<LabeledEdge>,
}

impl LabeledGraph {
    /// Builds the labeled view, checking that memberships and weights align.
    pub fn from_generated(graph: &GeneratedGraph) -> Result<Self, GraphGenError> {
        if graph.memberships.len() != graph.num_nodes {
            return Err(GraphGenError::Dimension(
                ErrorInfo::new("membership-length", "one membership list per node expected")
                    .with_context("memberships", graph.memberships.len())
                    .with_context("num_nodes", graph.num_nodes),
            ));
        }
        if let Some(weights) = &graph.weights {
            if weights.len() != graph.edges.len() {
                return Err(GraphGenError::Dimension(
                    ErrorInfo::new("weight-length", "weights must align with edges")
                        .with_context("edges", graph.edges.len())
                        .with_context("weights", weights.len()),
                ));
            }
        }
        let nodes = graph
            .memberships
            .iter()
            .enumerate()
            .map(|(id, communities)| LabeledNode {
                id,
                communities: communities.clone(),
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .enumerate()
            .map(|(index, &[source, target])| LabeledEdge {
                source,
                target,
                weight: graph.weights.as_ref().map(|weights| weights[index]),
            })
            .collect();
        Ok(Self {
            directed: graph.directed,
            nodes,
            edges,
        })
    }

    /// Node by id.
    pub fn node(&self, id: usize) -> Option<&LabeledNode> {
        self.nodes.get(id)
    }

    /// Ids of the nodes belonging to `community`.
    pub fn community(&self, community: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|node| node.communities.contains(&community))
            .map(|node| node.id)
            .collect()
    }

    /// Adjacent node ids; successors only for directed graphs.
    pub fn neighbors(&self, id: usize) -> Vec<usize> {
        let mut neighbors: Vec<usize> = self
            .edges
            .iter()
            .filter_map(|edge| {
                if edge.source == id {
                    Some(edge.target)
                } else if !self.directed && edge.target == id {
                    Some(edge.source)
                } else {
                    None
                }
            })
            .collect();
        neighbors.sort_unstable();
        neighbors
    }
}
