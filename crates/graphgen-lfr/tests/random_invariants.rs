use std::collections::BTreeSet;

use graphgen_lfr::{unweighted_undirected, LfrConfig, RoundingPolicy, UndirectedConfig};
use proptest::prelude::*;

fn rounding_policy() -> impl Strategy<Value = RoundingPolicy> {
    prop_oneof![
        Just(RoundingPolicy::Nearest),
        Just(RoundingPolicy::Excess),
        Just(RoundingPolicy::Defect),
        Just(RoundingPolicy::RandomF),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn generated_graphs_are_simple_partitions(
        seed in any::<u64>(),
        nodes in 80usize..160,
        mu in 0.05f64..0.4,
        rounding in rounding_policy(),
    ) {
        let mut lfr = LfrConfig::new(nodes, 5.0, 10, mu, 10, 20, seed);
        lfr.rounding = rounding;
        let graph = unweighted_undirected(&UndirectedConfig::new(lfr)).unwrap();

        let mut seen = BTreeSet::new();
        for &[u, v] in &graph.edges {
            prop_assert!(u < v && v < nodes);
            prop_assert!(seen.insert((u, v)));
        }
        for held in &graph.memberships {
            prop_assert_eq!(held.len(), 1);
        }
        for list in graph.community_members() {
            prop_assert!((10..=20).contains(&list.len()));
        }
        let stubs: usize = graph.degrees().iter().sum();
        let planned = 5 * nodes + (5 * nodes) % 2;
        prop_assert!(stubs + graph.report.stubs_dropped >= planned);
        prop_assert!(stubs <= planned + graph.report.stubs_added);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn every_policy_lands_near_the_target_mixing(
        seed in any::<u64>(),
        mu in 0.1f64..0.4,
        rounding in rounding_policy(),
    ) {
        let mut lfr = LfrConfig::new(240, 10.0, 30, mu, 20, 50, seed);
        lfr.rounding = rounding;
        let graph = unweighted_undirected(&UndirectedConfig::new(lfr)).unwrap();
        let mixing = graph.report.realized_mixing;
        prop_assert!(
            (mixing - mu).abs() < 0.1,
            "{:?} realized {} against {}",
            rounding,
            mixing,
            mu
        );
    }
}
