use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::{Edge, GeneratedGraph};
use nalgebra::DMatrix;

/// Dense adjacency of either weight kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DenseAdjacency {
    /// Cells hold `1` for present edges.
    Unweighted(DMatrix<i64>),
    /// Cells hold the edge weight.
    Weighted(DMatrix<f64>),
}

/// `num_nodes x num_nodes` matrix with `1` at `(tail, head)` for every edge.
///
/// With `transpose` the axes are swapped, so the cell is `(head, tail)`.
pub fn to_dense_unweighted(
    edges: &[Edge],
    num_nodes: usize,
    transpose: bool,
) -> Result<DMatrix<i64>, GraphGenError> {
    check_endpoints(edges, num_nodes)?;
    let mut matrix = DMatrix::<i64>::zeros(num_nodes, num_nodes);
    for &[tail, head] in edges {
        let (row, col) = if transpose { (head, tail) } else { (tail, head) };
        matrix[(row, col)] = 1;
    }
    Ok(matrix)
}

/// `num_nodes x num_nodes` matrix with the edge weight at `(tail, head)`.
pub fn to_dense_weighted(
    edges: &[Edge],
    weights: &[f64],
    num_nodes: usize,
    transpose: bool,
) -> Result<DMatrix<f64>, GraphGenError> {
    if weights.len() != edges.len() {
        return Err(GraphGenError::Dimension(
            ErrorInfo::new("weight-length", "weights must align with edges")
                .with_context("edges", edges.len())
                .with_context("weights", weights.len()),
        ));
    }
    check_endpoints(edges, num_nodes)?;
    let mut matrix = DMatrix::<f64>::zeros(num_nodes, num_nodes);
    for (&[tail, head], &weight) in edges.iter().zip(weights) {
        let (row, col) = if transpose { (head, tail) } else { (tail, head) };
        matrix[(row, col)] = weight;
    }
    Ok(matrix)
}

/// Dense adjacency of a generated graph, weighted when weights are attached.
pub fn dense_from_generated(
    graph: &GeneratedGraph,
    transpose: bool,
) -> Result<DenseAdjacency, GraphGenError> {
    match &graph.weights {
        Some(weights) => to_dense_weighted(&graph.edges, weights, graph.num_nodes, transpose)
            .map(DenseAdjacency::Weighted),
        None => to_dense_unweighted(&graph.edges, graph.num_nodes, transpose)
            .map(DenseAdjacency::Unweighted),
    }
}

fn check_endpoints(edges: &[Edge], num_nodes: usize) -> Result<(), GraphGenError> {
    match edges
        .iter()
        .find(|[tail, head]| *tail >= num_nodes || *head >= num_nodes)
    {
        Some(&[tail, head]) => Err(GraphGenError::Dimension(
            ErrorInfo::new("endpoint-out-of-range", "edge endpoint exceeds num_nodes")
                .with_context("tail", tail)
                .with_context("head", head)
                .with_context("num_nodes", num_nodes),
        )),
        None => Ok(()),
    }
}
