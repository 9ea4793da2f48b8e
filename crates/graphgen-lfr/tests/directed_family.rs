use std::collections::BTreeSet;

use graphgen_lfr::{unweighted_directed, weighted_directed, DirectedConfig, LfrConfig, WeightConfig};

fn config(seed: u64) -> DirectedConfig {
    DirectedConfig::new(LfrConfig::new(160, 8.0, 20, 0.2, 15, 45, seed))
}

#[test]
fn arcs_are_simple_and_sorted() {
    let graph = unweighted_directed(&config(4)).unwrap();
    assert!(graph.directed);
    let mut seen = BTreeSet::new();
    for &[tail, head] in &graph.edges {
        assert_ne!(tail, head);
        assert!(seen.insert((tail, head)));
    }
    let mut sorted = graph.edges.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, graph.edges);
    assert_eq!(graph.report.generator, "lfr-directed");
}

#[test]
fn degrees_and_mixing_follow_parameters() {
    let graph = unweighted_directed(&config(5)).unwrap();
    let mut out_degree = vec![0usize; graph.num_nodes];
    let mut in_degree = vec![0usize; graph.num_nodes];
    for &[tail, head] in &graph.edges {
        out_degree[tail] += 1;
        in_degree[head] += 1;
    }
    assert!(out_degree.iter().all(|&k| k <= 20));
    assert!(in_degree.iter().all(|&k| k <= 20));
    let arcs = graph.num_edges() + graph.report.stubs_dropped / 2;
    assert!(arcs.abs_diff(1280) <= 2);
    let mixing = graph.primary_mixing();
    assert!((mixing - 0.2).abs() < 0.07, "mixing {mixing}");
}

#[test]
fn weighted_arcs_carry_positive_weights() {
    let graph = weighted_directed(&config(6), &WeightConfig::new(0.2)).unwrap();
    let weights = graph.weights.as_ref().unwrap();
    assert_eq!(weights.len(), graph.num_edges());
    assert!(weights.iter().all(|&w| w > 0.0 && w.is_finite()));
    assert!(graph.report.weight_fit_error.is_some());
    assert_eq!(graph.report.generator, "lfr-directed-weighted");
}
