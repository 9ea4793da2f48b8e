use graphgen_core::provenance::{GraphProvenance, SchemaVersion};
use graphgen_core::{ClusteringSummary, GeneratedGraph, GenerationReport};

fn sample_graph() -> GeneratedGraph {
    GeneratedGraph {
        num_nodes: 4,
        directed: false,
        edges: vec![[0, 1], [1, 2], [2, 3]],
        memberships: vec![vec![0], vec![0, 1], vec![1], vec![1]],
        weights: Some(vec![1.0, 2.5, 0.5]),
        report: GenerationReport {
            generator: "weighted-undirected".into(),
            seed: 9,
            realized_mixing: 0.0,
            stubs_dropped: 0,
            stubs_added: 0,
            stubs_rerouted: 2,
            clustering: Some(ClusteringSummary {
                target: 0.3,
                initial: 0.0,
                achieved: 0.0,
                attempts: 256,
                accepted: 0,
            }),
            weight_fit_error: Some(1e-4),
        },
    }
}

#[test]
fn generated_graph_round_trips_json() {
    let graph = sample_graph();
    let json = serde_json::to_string_pretty(&graph).expect("serialize");
    let decoded: GeneratedGraph = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, graph);
}

#[test]
fn community_helpers_follow_memberships() {
    let graph = sample_graph();
    assert_eq!(graph.num_communities(), 2);
    assert_eq!(graph.community_members(), vec![vec![0, 1], vec![1, 2, 3]]);
    assert_eq!(graph.degrees(), vec![1, 2, 2, 1]);
    assert!(graph.is_internal([0, 1]));
    assert!(graph.is_internal([1, 2]));
    assert!((graph.primary_mixing() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn provenance_round_trips_json() {
    let provenance = GraphProvenance {
        schema_version: SchemaVersion::new(1, 0, 0),
        generator: "klemm".into(),
        config_hash: "cfg".into(),
        graph_hash: "graph".into(),
        seed: 7,
        tool_versions: [("graphgen-core".into(), "0.1.0".into())]
            .into_iter()
            .collect(),
    };
    let json = serde_json::to_string(&provenance).expect("serialize");
    let decoded: GraphProvenance = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, provenance);
}
