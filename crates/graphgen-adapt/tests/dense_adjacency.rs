use graphgen_adapt::{dense_from_generated, to_dense_unweighted, to_dense_weighted, DenseAdjacency};
use graphgen_core::GraphGenError;
use graphgen_lfr::{unweighted_directed, weighted_undirected, DirectedConfig, LfrConfig, UndirectedConfig, WeightConfig};
use proptest::prelude::*;

#[test]
fn cells_follow_tail_then_head() {
    let edges = vec![[0, 1], [1, 2], [2, 0]];
    let matrix = to_dense_unweighted(&edges, 3, false).unwrap();
    assert_eq!(matrix[(0, 1)], 1);
    assert_eq!(matrix[(1, 0)], 0);
    assert_eq!(matrix[(2, 0)], 1);
    assert_eq!(matrix.iter().sum::<i64>(), 3);

    let transposed = to_dense_unweighted(&edges, 3, true).unwrap();
    assert_eq!(transposed[(1, 0)], 1);
    assert_eq!(transposed[(0, 1)], 0);
}

#[test]
fn weighted_cells_hold_weights() {
    let matrix = to_dense_weighted(&[[0, 2], [1, 2]], &[0.5, 2.5], 3, false).unwrap();
    assert_eq!(matrix[(0, 2)], 0.5);
    assert_eq!(matrix[(1, 2)], 2.5);
    assert_eq!(matrix[(2, 1)], 0.0);
}

#[test]
fn rejects_out_of_range_endpoints() {
    match to_dense_unweighted(&[[0, 3]], 3, false) {
        Err(GraphGenError::Dimension(info)) => assert_eq!(info.code, "endpoint-out-of-range"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn rejects_misaligned_weights() {
    match to_dense_weighted(&[[0, 1]], &[1.0, 2.0], 2, false) {
        Err(GraphGenError::Dimension(info)) => assert_eq!(info.code, "weight-length"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn directed_graph_has_one_cell_per_arc() {
    let config = DirectedConfig::new(LfrConfig::new(120, 6.0, 15, 0.2, 12, 36, 3));
    let graph = unweighted_directed(&config).unwrap();
    match dense_from_generated(&graph, false).unwrap() {
        DenseAdjacency::Unweighted(matrix) => {
            assert_eq!(matrix.iter().sum::<i64>() as usize, graph.num_edges());
            let transposed = to_dense_unweighted(&graph.edges, graph.num_nodes, true).unwrap();
            assert_eq!(transposed, matrix.transpose());
        }
        other => panic!("unexpected adjacency: {other:?}"),
    }
}

#[test]
fn weighted_graph_yields_weighted_adjacency() {
    let config = UndirectedConfig::new(LfrConfig::new(150, 8.0, 20, 0.2, 15, 45, 12));
    let graph = weighted_undirected(&config, &WeightConfig::new(0.2)).unwrap();
    match dense_from_generated(&graph, false).unwrap() {
        DenseAdjacency::Weighted(matrix) => {
            let expected: f64 = graph.weights.as_ref().unwrap().iter().sum();
            assert!((matrix.iter().sum::<f64>() - expected).abs() < 1e-9 * expected.max(1.0));
        }
        other => panic!("unexpected adjacency: {other:?}"),
    }
}

proptest! {
    #[test]
    fn transpose_flag_matches_matrix_transpose(
        arcs in prop::collection::btree_set((0usize..12, 0usize..12), 0..40)
    ) {
        let edges: Vec<[usize; 2]> = arcs.into_iter().map(|(a, b)| [a, b]).collect();
        let plain = to_dense_unweighted(&edges, 12, false).unwrap();
        let flipped = to_dense_unweighted(&edges, 12, true).unwrap();
        prop_assert_eq!(flipped, plain.transpose());
    }
}
