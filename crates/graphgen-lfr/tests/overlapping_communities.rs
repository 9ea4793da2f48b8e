use graphgen_lfr::{unweighted_undirected, LfrConfig, UndirectedConfig};

#[test]
fn overlapping_nodes_hold_distinct_memberships() {
    let mut lfr = LfrConfig::new(200, 10.0, 25, 0.2, 20, 50, 31);
    lfr.overlapping_nodes = 20;
    lfr.overlap_membership = 2;
    let graph = unweighted_undirected(&UndirectedConfig::new(lfr)).unwrap();

    let multi = graph.memberships.iter().filter(|held| held.len() == 2).count();
    let single = graph.memberships.iter().filter(|held| held.len() == 1).count();
    assert_eq!(multi, 20);
    assert_eq!(single, 180);
    for held in &graph.memberships {
        if let [a, b] = held.as_slice() {
            assert_ne!(a, b);
        }
    }

    let members = graph.community_members();
    assert_eq!(members.iter().map(Vec::len).sum::<usize>(), 220);
    assert!(members.len() >= 2);
    for list in &members {
        assert!((20..=50).contains(&list.len()));
    }
}

#[test]
fn overlap_requires_room_for_every_membership() {
    let mut lfr = LfrConfig::new(60, 5.0, 12, 0.2, 20, 30, 3);
    lfr.overlapping_nodes = 5;
    lfr.overlap_membership = 4;
    let err = unweighted_undirected(&UndirectedConfig::new(lfr)).unwrap_err();
    assert_eq!(err.info().code, "overlap-membership-too-large");
}
