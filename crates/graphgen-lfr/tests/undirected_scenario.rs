use std::collections::BTreeSet;

use graphgen_core::GeneratedGraph;
use graphgen_lfr::{unweighted_undirected, LfrConfig, UndirectedConfig};

fn example_config(seed: u64) -> UndirectedConfig {
    UndirectedConfig::new(LfrConfig::new(128, 8.0, 20, 0.1, 10, 30, seed))
}

fn assert_simple(graph: &GeneratedGraph) {
    let mut seen = BTreeSet::new();
    for &[u, v] in &graph.edges {
        assert!(u < v, "undirected edges are stored tail < head");
        assert!(v < graph.num_nodes);
        assert!(seen.insert((u, v)), "duplicate edge {u}-{v}");
    }
    let mut sorted = graph.edges.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, graph.edges);
}

#[test]
fn example_graph_matches_its_parameters() {
    let graph = unweighted_undirected(&example_config(42)).unwrap();
    assert_simple(&graph);
    assert!(!graph.directed);
    assert!(!graph.is_weighted());
    assert_eq!(graph.num_nodes, 128);
    assert_eq!(graph.memberships.len(), 128);

    let stubs: usize = graph.degrees().iter().sum();
    assert_eq!(stubs, 2 * graph.num_edges());
    let planned = 1024;
    assert!(planned - stubs <= 2 * graph.report.stubs_dropped);
    assert!(graph.degrees().iter().all(|&k| k <= 20));

    for held in &graph.memberships {
        assert_eq!(held.len(), 1);
    }
    let members = graph.community_members();
    assert_eq!(members.iter().map(Vec::len).sum::<usize>(), 128);
    for list in &members {
        assert!((10..=30).contains(&list.len()), "community size {}", list.len());
    }

    let mixing = graph.primary_mixing();
    assert!((mixing - 0.1).abs() < 0.05, "mixing {mixing}");
    assert!((graph.report.realized_mixing - mixing).abs() < 1e-12);
    assert_eq!(graph.report.generator, "lfr-undirected");
    assert_eq!(graph.report.seed, 42);
    assert_eq!(graph.report.stubs_added, 0);
}

#[test]
fn every_node_has_an_edge() {
    let graph = unweighted_undirected(&example_config(7)).unwrap();
    let isolated = graph.degrees().iter().filter(|&&k| k == 0).count();
    assert!(isolated <= graph.report.stubs_dropped);
}

#[test]
fn derived_size_range_follows_degrees() {
    let mut config = example_config(5);
    config.lfr.fixed_range = false;
    let graph = unweighted_undirected(&config).unwrap();
    for list in graph.community_members() {
        assert!(list.len() >= 3);
        assert!(list.len() <= 20);
    }
}

#[test]
fn example_parameters_generate_across_seeds() {
    for seed in 0..40 {
        let graph = match unweighted_undirected(&example_config(seed)) {
            Ok(graph) => graph,
            Err(err) => panic!("seed {seed} failed: {err:?}"),
        };
        assert_simple(&graph);
        let stubs: usize = graph.degrees().iter().sum();
        assert!(1024 - stubs <= 2 * graph.report.stubs_dropped, "seed {seed}");
        let members = graph.community_members();
        assert_eq!(members.iter().map(Vec::len).sum::<usize>(), 128);
        assert!(members.iter().all(|list| (10..=30).contains(&list.len())));
        let mixing = graph.primary_mixing();
        assert!((mixing - 0.1).abs() < 0.06, "seed {seed} mixing {mixing}");
    }
}
