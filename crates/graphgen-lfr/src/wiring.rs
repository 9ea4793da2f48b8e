//! Undirected stub matching with reshuffles and edge switches.
//!
//! Each pool is shuffled and paired; pairs that would form a self-loop,
//! a duplicate or a forbidden edge are reshuffled, and survivors of every
//! round are spliced into an existing edge of the same pool. A pool that
//! stays stuck is re-paired from scratch a bounded number of times. A
//! community pool that still fails is rebuilt by Havel–Hakimi and
//! randomized by degree-preserving swaps; whatever that leaves over moves to
//! the external pool.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::shares_community;
use graphgen_core::rng::RngHandle;
use graphgen_core::topology::UndirectedTopology;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::assignment::Assignment;
use crate::budget::StubBudget;
use crate::config::RoundingPolicy;

/// Shuffle-and-pair rounds per stub pool.
pub const RESHUFFLE_ROUNDS: usize = 32;
/// Edge-switch proposals per leftover stub pair.
pub const SWITCH_ATTEMPTS: usize = 64;
/// Full re-pairings of a pool before falling back.
pub const POOL_RESTARTS: usize = 8;
/// Degree-preserving swap proposals per edge after a Havel–Hakimi rebuild.
pub const SHUFFLE_SWAPS_PER_EDGE: usize = 10;

/// Stubs added, dropped or moved while resolving unmatched stubs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WiringStats {
    /// Edges attached to an arbitrary valid partner.
    pub added: usize,
    /// Stubs discarded.
    pub dropped: usize,
    /// Internal stubs that could not be wired inside their community and
    /// were matched in the external pool instead.
    pub rerouted: usize,
}

/// Largest number of unmatched stubs a pool may leave before matching fails.
pub(crate) fn unresolved_limit(pool_size: usize) -> usize {
    (pool_size / 20).max(4)
}

/// Whether an unmatched stub is attached to a fresh partner rather than dropped.
pub(crate) fn attaches(policy: RoundingPolicy, rng: &mut RngHandle) -> bool {
    match policy {
        RoundingPolicy::Excess => true,
        RoundingPolicy::RandomF => rng.gen_bool(0.5),
        RoundingPolicy::Nearest | RoundingPolicy::Defect => false,
    }
}

pub(crate) fn unmatched_error(pool: &str, unresolved: usize, pool_size: usize) -> GraphGenError {
    GraphGenError::Convergence(
        ErrorInfo::new("stub-matching", "too many stubs could not be matched")
            .with_context("pool", pool)
            .with_context("unresolved", unresolved)
            .with_context("pool_size", pool_size),
    )
}

/// Edges placed from one pool and the stubs left over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Matching {
    placed: Vec<[usize; 2]>,
    unresolved: Vec<usize>,
}

/// Matches every internal pool, then the external pool, into a simple graph.
///
/// Internal stubs of a community pair only with members of that community.
/// External stubs pair only between nodes that share no community.
pub fn wire_undirected(
    budget: &StubBudget,
    assignment: &Assignment,
    policy: RoundingPolicy,
    rng: &mut RngHandle,
) -> Result<(UndirectedTopology, WiringStats), GraphGenError> {
    let num_nodes = assignment.memberships.len();
    let mut topology = UndirectedTopology::new(num_nodes);
    let mut stats = WiringStats::default();

    let mut pools: Vec<Vec<usize>> = vec![Vec::new(); assignment.sizes.len()];
    for (node, communities) in assignment.memberships.iter().enumerate() {
        for (slot, &community) in communities.iter().enumerate() {
            pools[community].extend(std::iter::repeat(node).take(budget.internal[node][slot]));
        }
    }
    let mut external_stubs = budget.external.clone();
    let anyone = |_: usize, _: usize| true;
    for (community, stubs) in pools.iter().enumerate() {
        let mut matching = match_pool(&mut topology, stubs, &anyone, rng);
        if !matching.unresolved.is_empty() {
            matching = rebuild_pool(&mut topology, stubs, matching, rng);
        }
        if matching.unresolved.is_empty() {
            continue;
        }
        warn!(
            community,
            rerouted = matching.unresolved.len(),
            "internal stubs moved to the external pool"
        );
        stats.rerouted += matching.unresolved.len();
        for &node in &matching.unresolved {
            external_stubs[node] += 1;
        }
    }

    let memberships = &assignment.memberships;
    let disjoint = |u: usize, v: usize| !shares_community(&memberships[u], &memberships[v]);
    let external: Vec<usize> = external_stubs
        .iter()
        .enumerate()
        .flat_map(|(node, &count)| std::iter::repeat(node).take(count))
        .collect();
    let matching = match_pool(&mut topology, &external, &disjoint, rng);
    let everyone: Vec<usize> = (0..num_nodes).collect();
    resolve_unmatched(
        &mut topology,
        &matching.unresolved,
        &everyone,
        &disjoint,
        Pool {
            label: "external",
            size: external.len(),
            policy,
        },
        &mut stats,
        rng,
    )?;
    debug!(
        edges = topology.num_edges(),
        added = stats.added,
        dropped = stats.dropped,
        rerouted = stats.rerouted,
        "stub matching complete"
    );
    Ok((topology, stats))
}

/// Pairs `stubs`, starting over from an untouched topology up to
/// [`POOL_RESTARTS`] times; keeps the attempt with the fewest leftovers.
fn match_pool<F>(
    topology: &mut UndirectedTopology,
    stubs: &[usize],
    allowed: &F,
    rng: &mut RngHandle,
) -> Matching
where
    F: Fn(usize, usize) -> bool,
{
    let mut best: Option<Matching> = None;
    for restart in 0..POOL_RESTARTS {
        let attempt = pair_stubs(topology, stubs.to_vec(), allowed, rng);
        if attempt.unresolved.is_empty() {
            if restart > 0 {
                debug!(restart, stubs = stubs.len(), "stub pool matched after restart");
            }
            return attempt;
        }
        for &[u, v] in &attempt.placed {
            topology.remove_edge(u, v);
        }
        if best
            .as_ref()
            .map_or(true, |kept| attempt.unresolved.len() < kept.unresolved.len())
        {
            best = Some(attempt);
        }
    }
    let best = best.unwrap_or_default();
    for &[u, v] in &best.placed {
        topology.add_edge(u, v);
    }
    best
}

/// Shuffles and pairs `pending`, then repairs leftovers by edge switches.
fn pair_stubs<F>(
    topology: &mut UndirectedTopology,
    mut pending: Vec<usize>,
    allowed: &F,
    rng: &mut RngHandle,
) -> Matching
where
    F: Fn(usize, usize) -> bool,
{
    let mut placed: Vec<[usize; 2]> = Vec::with_capacity(pending.len() / 2);
    for _ in 0..RESHUFFLE_ROUNDS {
        if pending.len() < 2 {
            break;
        }
        pending.shuffle(rng);
        let mut rejected = Vec::new();
        for pair in pending.chunks(2) {
            match pair {
                &[u, v] if allowed(u, v) && topology.add_edge(u, v) => placed.push([u, v]),
                _ => rejected.extend_from_slice(pair),
            }
        }
        pending = rejected;
    }

    let mut unresolved = Vec::new();
    for pair in pending.chunks(2) {
        match pair {
            &[u, v] if switch_in(topology, &mut placed, u, v, allowed, rng) => {}
            _ => unresolved.extend_from_slice(pair),
        }
    }
    Matching { placed, unresolved }
}

/// Replaces a placed edge `{a, b}` by `{u, a}` and `{v, b}`.
fn switch_in<F>(
    topology: &mut UndirectedTopology,
    placed: &mut Vec<[usize; 2]>,
    u: usize,
    v: usize,
    allowed: &F,
    rng: &mut RngHandle,
) -> bool
where
    F: Fn(usize, usize) -> bool,
{
    for _ in 0..SWITCH_ATTEMPTS {
        if placed.is_empty() {
            return false;
        }
        let index = rng.gen_range(0..placed.len());
        let [mut a, mut b] = placed[index];
        if rng.gen_bool(0.5) {
            std::mem::swap(&mut a, &mut b);
        }
        if a == u || a == v || b == u || b == v {
            continue;
        }
        if !allowed(u, a) || !allowed(v, b) || topology.contains(u, a) || topology.contains(v, b) {
            continue;
        }
        topology.remove_edge(a, b);
        topology.add_edge(u, a);
        topology.add_edge(v, b);
        placed[index] = [u, a];
        placed.push([v, b]);
        return true;
    }
    false
}

/// Swaps a stuck random matching of a community pool for a Havel–Hakimi
/// construction of the same stub counts, unless that leaves more over.
fn rebuild_pool(
    topology: &mut UndirectedTopology,
    stubs: &[usize],
    previous: Matching,
    rng: &mut RngHandle,
) -> Matching {
    for &[u, v] in &previous.placed {
        topology.remove_edge(u, v);
    }
    let mut rebuilt = havel_hakimi(topology, stubs);
    if rebuilt.unresolved.len() > previous.unresolved.len() {
        for &[u, v] in &rebuilt.placed {
            topology.remove_edge(u, v);
        }
        for &[u, v] in &previous.placed {
            topology.add_edge(u, v);
        }
        return previous;
    }
    shuffle_edges(topology, &mut rebuilt.placed, rng);
    debug!(
        edges = rebuilt.placed.len(),
        unresolved = rebuilt.unresolved.len(),
        "community pool rebuilt"
    );
    rebuilt
}

/// Links the node with the most remaining stubs to the nodes with the next
/// most, skipping partners already adjacent in `topology`.
///
/// Realizes every graphical stub multiset over an empty neighbourhood; stubs
/// that find no partner are returned unresolved.
fn havel_hakimi(topology: &mut UndirectedTopology, stubs: &[usize]) -> Matching {
    let mut remaining: BTreeMap<usize, usize> = BTreeMap::new();
    for &node in stubs {
        *remaining.entry(node).or_insert(0) += 1;
    }
    let mut matching = Matching::default();
    loop {
        let Some((hub, need)) = remaining
            .iter()
            .map(|(&node, &count)| (node, count))
            .max_by_key(|&(node, count)| (count, Reverse(node)))
        else {
            break;
        };
        remaining.remove(&hub);
        let mut partners: Vec<(usize, usize)> = remaining
            .iter()
            .map(|(&node, &count)| (node, count))
            .filter(|&(node, _)| topology.can_add(hub, node))
            .collect();
        partners.sort_by_key(|&(node, count)| (Reverse(count), node));
        let mut linked = 0;
        for (node, count) in partners.into_iter().take(need) {
            topology.add_edge(hub, node);
            matching.placed.push([hub, node]);
            linked += 1;
            if count == 1 {
                remaining.remove(&node);
            } else {
                remaining.insert(node, count - 1);
            }
        }
        matching
            .unresolved
            .extend(std::iter::repeat(hub).take(need - linked));
    }
    matching
}

/// Degree-preserving double-edge swaps `{a, b}, {c, d} -> {a, d}, {c, b}`.
fn shuffle_edges(topology: &mut UndirectedTopology, placed: &mut [[usize; 2]], rng: &mut RngHandle) {
    if placed.len() < 2 {
        return;
    }
    for _ in 0..placed.len() * SHUFFLE_SWAPS_PER_EDGE {
        let first = rng.gen_range(0..placed.len());
        let second = rng.gen_range(0..placed.len());
        if first == second {
            continue;
        }
        let [a, b] = placed[first];
        let [mut c, mut d] = placed[second];
        if rng.gen_bool(0.5) {
            std::mem::swap(&mut c, &mut d);
        }
        if a == c || a == d || b == c || b == d {
            continue;
        }
        if topology.contains(a, d) || topology.contains(c, b) {
            continue;
        }
        topology.remove_edge(a, b);
        topology.remove_edge(c, d);
        topology.add_edge(a, d);
        topology.add_edge(c, b);
        placed[first] = [a, d];
        placed[second] = [c, b];
    }
}

struct Pool<'a> {
    label: &'a str,
    size: usize,
    policy: RoundingPolicy,
}

fn resolve_unmatched<F>(
    topology: &mut UndirectedTopology,
    unresolved: &[usize],
    partners: &[usize],
    allowed: &F,
    pool: Pool<'_>,
    stats: &mut WiringStats,
    rng: &mut RngHandle,
) -> Result<(), GraphGenError>
where
    F: Fn(usize, usize) -> bool,
{
    if unresolved.is_empty() {
        return Ok(());
    }
    if unresolved.len() > unresolved_limit(pool.size) {
        return Err(unmatched_error(pool.label, unresolved.len(), pool.size));
    }
    for &stub in unresolved {
        if attaches(pool.policy, rng) {
            let mut shuffled = partners.to_vec();
            shuffled.shuffle(rng);
            let partner = shuffled
                .into_iter()
                .find(|&w| allowed(stub, w) && topology.can_add(stub, w));
            if let Some(partner) = partner {
                topology.add_edge(stub, partner);
                stats.added += 1;
                continue;
            }
        }
        stats.dropped += 1;
    }
    warn!(
        pool = pool.label,
        unresolved = unresolved.len(),
        "stubs left unmatched after edge switching"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_respect_community_boundaries() {
        let assignment = Assignment {
            memberships: (0..12).map(|node| vec![node / 6]).collect(),
            demands: vec![vec![2]; 12],
            sizes: vec![6, 6],
        };
        let degrees = vec![3; 12];
        let budget = StubBudget::new(&degrees, &assignment);
        let mut rng = RngHandle::from_seed(21);
        let (topology, stats) =
            wire_undirected(&budget, &assignment, RoundingPolicy::Nearest, &mut rng).unwrap();
        let edges = topology.edges();
        let internal = edges.iter().filter(|[u, v]| u / 6 == v / 6).count();
        assert!(internal <= 12);
        assert!(edges.len() - internal <= 6);
        assert!(edges.len() >= 16);
        assert_eq!(stats.added, 0);
        for node in 0..12 {
            assert!(topology.degree(node) <= 3);
        }
    }

    #[test]
    fn saturated_community_becomes_a_clique() {
        let assignment = Assignment {
            memberships: vec![vec![0]; 6],
            demands: vec![vec![5]; 6],
            sizes: vec![6],
        };
        let budget = StubBudget::new(&[5; 6], &assignment);
        for seed in 0..16 {
            let mut rng = RngHandle::from_seed(seed);
            let (topology, stats) =
                wire_undirected(&budget, &assignment, RoundingPolicy::Nearest, &mut rng).unwrap();
            assert_eq!(topology.num_edges(), 15, "seed {seed}");
            assert_eq!(stats, WiringStats::default());
        }
    }

    #[test]
    fn unrealizable_community_moves_stubs_outside() {
        let assignment = Assignment {
            memberships: (0..8).map(|node| vec![node / 4]).collect(),
            demands: vec![vec![3], vec![3], vec![1], vec![1], vec![1], vec![1], vec![1], vec![1]],
            sizes: vec![4, 4],
        };
        let budget = StubBudget::new(&[3, 3, 1, 1, 2, 2, 1, 1], &assignment);
        let mut rng = RngHandle::from_seed(5);
        let (topology, stats) =
            wire_undirected(&budget, &assignment, RoundingPolicy::Nearest, &mut rng).unwrap();
        assert_eq!(stats.rerouted, 2);
        assert_eq!(stats.dropped, 0);
        assert_eq!(topology.degree(1), 3);
        assert!(topology.contains(1, 4));
        assert!(topology.contains(1, 5));
    }

    #[test]
    fn havel_hakimi_realizes_graphical_counts() {
        let mut topology = UndirectedTopology::new(6);
        let stubs: Vec<usize> = [4, 3, 3, 2, 2, 2]
            .iter()
            .enumerate()
            .flat_map(|(node, &count)| std::iter::repeat(node).take(count))
            .collect();
        let matching = havel_hakimi(&mut topology, &stubs);
        assert!(matching.unresolved.is_empty());
        assert_eq!(matching.placed.len(), 8);
        let degrees: Vec<usize> = (0..6).map(|node| topology.degree(node)).collect();
        assert_eq!(degrees, vec![4, 3, 3, 2, 2, 2]);
    }

    #[test]
    fn limit_has_a_floor() {
        assert_eq!(unresolved_limit(10), 4);
        assert_eq!(unresolved_limit(400), 20);
    }
}
