//! Adjacency containers used while a graph is being wired.
//!
//! Both containers keep neighbour sets in `BTreeSet`s so that iteration order,
//! and therefore every downstream random draw, is independent of hashing.

use std::collections::BTreeSet;

/// Simple undirected graph over contiguous node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndirectedTopology {
    adjacency: Vec<BTreeSet<usize>>,
    edge_count: usize,
}

impl UndirectedTopology {
    /// Creates an empty graph with `num_nodes` isolated nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); num_nodes],
            edge_count: 0,
        }
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.edge_count
    }

    /// Returns whether `u` and `v` are adjacent.
    pub fn contains(&self, u: usize, v: usize) -> bool {
        self.adjacency.get(u).is_some_and(|set| set.contains(&v))
    }

    /// Returns whether the edge `{u, v}` can be added without breaking simplicity.
    pub fn can_add(&self, u: usize, v: usize) -> bool {
        u != v && u < self.num_nodes() && v < self.num_nodes() && !self.contains(u, v)
    }

    /// Adds the edge `{u, v}`; returns `false` for self-loops, duplicates or unknown nodes.
    pub fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if !self.can_add(u, v) {
            return false;
        }
        self.adjacency[u].insert(v);
        self.adjacency[v].insert(u);
        self.edge_count += 1;
        true
    }

    /// Removes the edge `{u, v}` if present.
    pub fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        if !self.contains(u, v) {
            return false;
        }
        self.adjacency[u].remove(&v);
        self.adjacency[v].remove(&u);
        self.edge_count -= 1;
        true
    }

    /// Neighbour set of `node`.
    pub fn neighbors(&self, node: usize) -> &BTreeSet<usize> {
        &self.adjacency[node]
    }

    /// Degree of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Number of triangles through `node`.
    pub fn triangles(&self, node: usize) -> usize {
        let neighbours: Vec<usize> = self.adjacency[node].iter().copied().collect();
        let mut count = 0;
        for (idx, &a) in neighbours.iter().enumerate() {
            for &b in &neighbours[idx + 1..] {
                if self.adjacency[a].contains(&b) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Local clustering coefficient of `node` (0 for degree below 2).
    pub fn local_clustering(&self, node: usize) -> f64 {
        let degree = self.degree(node);
        if degree < 2 {
            return 0.0;
        }
        let pairs = degree * (degree - 1) / 2;
        self.triangles(node) as f64 / pairs as f64
    }

    /// Mean of the local clustering coefficients over all nodes.
    pub fn average_clustering(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        let total: f64 = (0..self.num_nodes())
            .map(|node| self.local_clustering(node))
            .sum();
        total / self.num_nodes() as f64
    }

    /// Canonical edge list: `[tail, head]` with `tail < head`, sorted row-major.
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (tail, heads) in self.adjacency.iter().enumerate() {
            for &head in heads.range(tail + 1..) {
                edges.push([tail, head]);
            }
        }
        edges
    }
}

/// Simple directed graph over contiguous node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectedTopology {
    successors: Vec<BTreeSet<usize>>,
    predecessors: Vec<BTreeSet<usize>>,
    arc_count: usize,
}

impl DirectedTopology {
    /// Creates an empty digraph with `num_nodes` isolated nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            successors: vec![BTreeSet::new(); num_nodes],
            predecessors: vec![BTreeSet::new(); num_nodes],
            arc_count: 0,
        }
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.successors.len()
    }

    /// Number of arcs.
    pub fn num_arcs(&self) -> usize {
        self.arc_count
    }

    /// Returns whether the arc `tail -> head` exists.
    pub fn contains(&self, tail: usize, head: usize) -> bool {
        self.successors
            .get(tail)
            .is_some_and(|set| set.contains(&head))
    }

    /// Returns whether `tail -> head` can be added without breaking simplicity.
    pub fn can_add(&self, tail: usize, head: usize) -> bool {
        tail != head
            && tail < self.num_nodes()
            && head < self.num_nodes()
            && !self.contains(tail, head)
    }

    /// Adds `tail -> head`; returns `false` for self-loops, duplicates or unknown nodes.
    pub fn add_arc(&mut self, tail: usize, head: usize) -> bool {
        if !self.can_add(tail, head) {
            return false;
        }
        self.successors[tail].insert(head);
        self.predecessors[head].insert(tail);
        self.arc_count += 1;
        true
    }

    /// Removes `tail -> head` if present.
    pub fn remove_arc(&mut self, tail: usize, head: usize) -> bool {
        if !self.contains(tail, head) {
            return false;
        }
        self.successors[tail].remove(&head);
        self.predecessors[head].remove(&tail);
        self.arc_count -= 1;
        true
    }

    /// Out-degree of `node`.
    pub fn out_degree(&self, node: usize) -> usize {
        self.successors[node].len()
    }

    /// In-degree of `node`.
    pub fn in_degree(&self, node: usize) -> usize {
        self.predecessors[node].len()
    }

    /// Arc list sorted by tail, then head.
    pub fn arcs(&self) -> Vec<[usize; 2]> {
        let mut arcs = Vec::with_capacity(self.arc_count);
        for (tail, heads) in self.successors.iter().enumerate() {
            arcs.extend(heads.iter().map(|&head| [tail, head]));
        }
        arcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undirected_rejects_loops_and_duplicates() {
        let mut graph = UndirectedTopology::new(3);
        assert!(graph.add_edge(0, 1));
        assert!(!graph.add_edge(1, 0));
        assert!(!graph.add_edge(2, 2));
        assert!(!graph.add_edge(2, 3));
        assert_eq!(graph.num_edges(), 1);
        assert_eq!(graph.edges(), vec![[0, 1]]);
    }

    #[test]
    fn triangle_has_unit_clustering() {
        let mut graph = UndirectedTopology::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(0, 2);
        graph.add_edge(2, 3);
        assert_eq!(graph.triangles(2), 1);
        assert!((graph.local_clustering(0) - 1.0).abs() < 1e-12);
        assert!((graph.local_clustering(2) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(graph.local_clustering(3), 0.0);
    }

    #[test]
    fn directed_keeps_both_orientations() {
        let mut graph = DirectedTopology::new(2);
        assert!(graph.add_arc(0, 1));
        assert!(graph.add_arc(1, 0));
        assert!(!graph.add_arc(0, 1));
        assert_eq!(graph.arcs(), vec![[0, 1], [1, 0]]);
        assert!(graph.remove_arc(0, 1));
        assert_eq!(graph.out_degree(0), 0);
        assert_eq!(graph.in_degree(0), 1);
    }
}
