use graphgen_lfr::{unweighted_undirected, weighted_undirected, LfrConfig, UndirectedConfig, WeightConfig};

fn config() -> UndirectedConfig {
    UndirectedConfig::new(LfrConfig::new(300, 12.0, 30, 0.3, 25, 75, 64))
}

#[test]
fn weights_align_with_edges() {
    let graph = weighted_undirected(&config(), &WeightConfig::new(0.3)).unwrap();
    let weights = graph.weights.as_ref().unwrap();
    assert_eq!(weights.len(), graph.num_edges());
    assert!(weights.iter().all(|&w| w > 0.0 && w.is_finite()));
    assert_eq!(graph.report.generator, "lfr-undirected-weighted");
}

#[test]
fn external_strength_share_tracks_muw() {
    let graph = weighted_undirected(&config(), &WeightConfig::new(0.3)).unwrap();
    let weights = graph.weights.as_ref().unwrap();
    let mut external = 0.0;
    let mut total = 0.0;
    for (edge, weight) in graph.edges.iter().zip(weights) {
        total += weight;
        if !graph.is_internal(*edge) {
            external += weight;
        }
    }
    let share = external / total;
    assert!((share - 0.3).abs() < 0.1, "external share {share}");
}

#[test]
fn every_mixed_node_splits_its_strength_by_muw() {
    let graph = weighted_undirected(&config(), &WeightConfig::new(0.3)).unwrap();
    let weights = graph.weights.as_ref().unwrap();
    let mut shares = vec![[0.0f64; 2]; graph.num_nodes];
    for (edge, weight) in graph.edges.iter().zip(weights) {
        let side = usize::from(!graph.is_internal(*edge));
        shares[edge[0]][side] += weight;
        shares[edge[1]][side] += weight;
    }
    let mut checked = 0;
    for (node, [internal, external]) in shares.into_iter().enumerate() {
        if internal == 0.0 || external == 0.0 {
            continue;
        }
        let share = external / (internal + external);
        assert!((share - 0.3).abs() < 0.05, "node {node} external share {share}");
        checked += 1;
    }
    assert!(checked > 0);
    assert!(graph.report.weight_fit_error.unwrap() < 0.1);
}

#[test]
fn topology_matches_the_unweighted_family() {
    let weighted = weighted_undirected(&config(), &WeightConfig::new(0.1)).unwrap();
    let plain = unweighted_undirected(&config()).unwrap();
    assert_eq!(weighted.edges, plain.edges);
    assert_eq!(weighted.memberships, plain.memberships);
}

#[test]
fn invalid_weight_parameters_are_rejected() {
    let err = weighted_undirected(&config(), &WeightConfig::new(-0.1)).unwrap_err();
    assert_eq!(err.info().code, "weight-mixing-range");
}
