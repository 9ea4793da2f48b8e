//! Directed stub budgets and arc matching.

use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::shares_community;
use graphgen_core::rng::RngHandle;
use graphgen_core::topology::DirectedTopology;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::assignment::Assignment;
use crate::budget::{parity_fix, ParityFix};
use crate::config::RoundingPolicy;
use crate::wiring::{
    attaches, unmatched_error, unresolved_limit, WiringStats, POOL_RESTARTS, RESHUFFLE_ROUNDS,
    SWITCH_ATTEMPTS,
};

/// Single-stub moves allowed while balancing one community or the external pool.
pub const BALANCE_MOVE_LIMIT: usize = 100_000;

fn balance_error(pool: &str, out_total: usize, in_total: usize) -> GraphGenError {
    GraphGenError::Convergence(
        ErrorInfo::new("arc-balance", "out- and in-stub totals could not be equalized")
            .with_context("pool", pool)
            .with_context("moves", BALANCE_MOVE_LIMIT)
            .with_context("out_total", out_total)
            .with_context("in_total", in_total),
    )
}

/// Internal and external stubs of one arc direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideBudget {
    /// Internal stubs per node, aligned with the node's memberships.
    pub internal: Vec<Vec<usize>>,
    /// External stubs per node.
    pub external: Vec<usize>,
}

impl SideBudget {
    fn new(degrees: &[usize], internal: Vec<Vec<usize>>) -> Self {
        let external = degrees
            .iter()
            .zip(&internal)
            .map(|(&degree, slots)| degree.saturating_sub(slots.iter().sum()))
            .collect();
        Self { internal, external }
    }

    fn internal_total(&self, node: usize) -> usize {
        self.internal[node].iter().sum()
    }

    fn community_total(&self, slots: &[(usize, usize)]) -> usize {
        slots
            .iter()
            .map(|&(node, slot)| self.internal[node][slot])
            .sum()
    }
}

/// Out- and in-stub budgets of a directed graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedBudget {
    /// Out-stubs (arc tails).
    pub outgoing: SideBudget,
    /// In-stubs (arc heads).
    pub incoming: SideBudget,
    /// Stubs created while balancing.
    pub added: usize,
    /// Stubs removed while balancing.
    pub dropped: usize,
}

/// Fractional internal shares of both directions.
#[derive(Debug, Clone, Copy)]
pub struct IdealShares<'a> {
    /// Ideal internal out-degree per node.
    pub outgoing: &'a [f64],
    /// Ideal internal in-degree per node.
    pub incoming: &'a [f64],
}

impl DirectedBudget {
    /// Builds budgets from degree sequences and per-slot internal stubs.
    pub fn new(
        out_degrees: &[usize],
        in_degrees: &[usize],
        out_slots: Vec<Vec<usize>>,
        in_slots: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            outgoing: SideBudget::new(out_degrees, out_slots),
            incoming: SideBudget::new(in_degrees, in_slots),
            added: 0,
            dropped: 0,
        }
    }

    /// Equalizes internal out- and in-stubs inside every community, then the external totals.
    pub fn balance(
        &mut self,
        assignment: &Assignment,
        ideal: IdealShares<'_>,
        policy: RoundingPolicy,
        rng: &mut RngHandle,
    ) -> Result<(), GraphGenError> {
        for (community, members) in assignment.members().iter().enumerate() {
            let slots: Vec<(usize, usize)> = members
                .iter()
                .filter_map(|&node| assignment.slot_of(node, community).map(|slot| (node, slot)))
                .collect();
            let size = assignment.sizes[community];
            let mut moves = 0;
            loop {
                let out_total = self.outgoing.community_total(&slots);
                let in_total = self.incoming.community_total(&slots);
                if out_total == in_total {
                    break;
                }
                if moves == BALANCE_MOVE_LIMIT {
                    let pool = format!("community {community}");
                    return Err(balance_error(&pool, out_total, in_total));
                }
                let out_heavy = out_total > in_total;
                let (heavy, light, heavy_ideal, light_ideal) = if out_heavy {
                    (&mut self.outgoing, &mut self.incoming, ideal.outgoing, ideal.incoming)
                } else {
                    (&mut self.incoming, &mut self.outgoing, ideal.incoming, ideal.outgoing)
                };
                let fix = parity_fix(policy, rng);
                let applied = match fix {
                    ParityFix::Shift => {
                        shift_closest(heavy, light, &slots, size, heavy_ideal, light_ideal)
                    }
                    ParityFix::Add => add_stub(light, &slots, size, rng),
                    ParityFix::Remove => false,
                };
                match (fix, applied) {
                    (ParityFix::Shift, true) => {}
                    (ParityFix::Add, true) => self.added += 1,
                    _ => {
                        remove_stub(heavy, &slots, rng);
                        self.dropped += 1;
                    }
                }
                moves += 1;
            }
            if moves > 0 {
                debug!(community, moves, "internal arc stubs balanced");
            }
        }
        self.balance_external(policy, rng)
    }

    fn balance_external(
        &mut self,
        policy: RoundingPolicy,
        rng: &mut RngHandle,
    ) -> Result<(), GraphGenError> {
        for _ in 0..BALANCE_MOVE_LIMIT {
            let out_total: usize = self.outgoing.external.iter().sum();
            let in_total: usize = self.incoming.external.iter().sum();
            if out_total == in_total {
                return Ok(());
            }
            let (heavy, light) = if out_total > in_total {
                (&mut self.outgoing, &mut self.incoming)
            } else {
                (&mut self.incoming, &mut self.outgoing)
            };
            if matches!(parity_fix(policy, rng), ParityFix::Add) && !light.external.is_empty() {
                let node = rng.gen_range(0..light.external.len());
                light.external[node] += 1;
                self.added += 1;
                continue;
            }
            let filled: Vec<usize> = (0..heavy.external.len())
                .filter(|&node| heavy.external[node] > 0)
                .collect();
            if filled.is_empty() {
                return Ok(());
            }
            let node = filled[rng.gen_range(0..filled.len())];
            heavy.external[node] -= 1;
            self.dropped += 1;
        }
        let out_total: usize = self.outgoing.external.iter().sum();
        let in_total: usize = self.incoming.external.iter().sum();
        if out_total == in_total {
            Ok(())
        } else {
            Err(balance_error("external", out_total, in_total))
        }
    }
}

/// Moves one stub out of the heavy side's internal budget, or one stub of the
/// light side into its internal budget, whichever member strayed furthest.
fn shift_closest(
    heavy: &mut SideBudget,
    light: &mut SideBudget,
    slots: &[(usize, usize)],
    size: usize,
    heavy_ideal: &[f64],
    light_ideal: &[f64],
) -> bool {
    let mut best: Option<(f64, usize, usize, bool)> = None;
    for &(node, slot) in slots {
        let heavy_residual = heavy_ideal[node] - heavy.internal_total(node) as f64;
        if heavy.internal[node][slot] > 0
            && best.map_or(true, |(score, ..)| -heavy_residual > score)
        {
            best = Some((-heavy_residual, node, slot, true));
        }
        let light_residual = light_ideal[node] - light.internal_total(node) as f64;
        if light.external[node] > 0
            && light.internal[node][slot] + 1 < size
            && best.map_or(true, |(score, ..)| light_residual > score)
        {
            best = Some((light_residual, node, slot, false));
        }
    }
    let Some((_, node, slot, from_heavy)) = best else {
        return false;
    };
    if from_heavy {
        heavy.internal[node][slot] -= 1;
        heavy.external[node] += 1;
    } else {
        light.internal[node][slot] += 1;
        light.external[node] -= 1;
    }
    true
}

fn add_stub(side: &mut SideBudget, slots: &[(usize, usize)], size: usize, rng: &mut RngHandle) -> bool {
    let open: Vec<(usize, usize)> = slots
        .iter()
        .copied()
        .filter(|&(node, slot)| side.internal[node][slot] + 1 < size)
        .collect();
    if open.is_empty() {
        return false;
    }
    let (node, slot) = open[rng.gen_range(0..open.len())];
    side.internal[node][slot] += 1;
    true
}

fn remove_stub(side: &mut SideBudget, slots: &[(usize, usize)], rng: &mut RngHandle) {
    let filled: Vec<(usize, usize)> = slots
        .iter()
        .copied()
        .filter(|&(node, slot)| side.internal[node][slot] > 0)
        .collect();
    if filled.is_empty() {
        return;
    }
    let (node, slot) = filled[rng.gen_range(0..filled.len())];
    side.internal[node][slot] -= 1;
}

/// Arcs placed from one pool and the tails and heads left over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ArcMatching {
    placed: Vec<[usize; 2]>,
    tails: Vec<usize>,
    heads: Vec<usize>,
}

impl ArcMatching {
    fn unresolved(&self) -> usize {
        self.tails.len() + self.heads.len()
    }
}

/// Matches out-stubs to in-stubs pool by pool into a simple digraph.
///
/// Internal stubs a community cannot wire join the external pool.
pub fn wire_directed(
    budget: &DirectedBudget,
    assignment: &Assignment,
    policy: RoundingPolicy,
    rng: &mut RngHandle,
) -> Result<(DirectedTopology, WiringStats), GraphGenError> {
    let num_nodes = assignment.memberships.len();
    let mut topology = DirectedTopology::new(num_nodes);
    let mut stats = WiringStats::default();

    let communities = assignment.sizes.len();
    let mut tail_pools: Vec<Vec<usize>> = vec![Vec::new(); communities];
    let mut head_pools: Vec<Vec<usize>> = vec![Vec::new(); communities];
    for (node, held) in assignment.memberships.iter().enumerate() {
        for (slot, &community) in held.iter().enumerate() {
            let tails = budget.outgoing.internal[node][slot];
            let heads = budget.incoming.internal[node][slot];
            tail_pools[community].extend(std::iter::repeat(node).take(tails));
            head_pools[community].extend(std::iter::repeat(node).take(heads));
        }
    }
    let mut external_tails = budget.outgoing.external.clone();
    let mut external_heads = budget.incoming.external.clone();
    let anyone = |_: usize, _: usize| true;
    for (community, (tails, heads)) in tail_pools.iter().zip(&head_pools).enumerate() {
        let loose = match_arcs(&mut topology, tails, heads, &anyone, rng);
        if loose.unresolved() == 0 {
            continue;
        }
        warn!(
            community,
            rerouted = loose.unresolved(),
            "internal arc stubs moved to the external pool"
        );
        stats.rerouted += loose.unresolved();
        for &tail in &loose.tails {
            external_tails[tail] += 1;
        }
        for &head in &loose.heads {
            external_heads[head] += 1;
        }
    }

    let memberships = &assignment.memberships;
    let disjoint = |u: usize, v: usize| !shares_community(&memberships[u], &memberships[v]);
    let expand = |counts: &[usize]| -> Vec<usize> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(node, &count)| std::iter::repeat(node).take(count))
            .collect()
    };
    let tails = expand(&external_tails);
    let heads = expand(&external_heads);
    let pool_size = tails.len() + heads.len();
    let loose = match_arcs(&mut topology, &tails, &heads, &disjoint, rng);
    let everyone: Vec<usize> = (0..num_nodes).collect();
    resolve_arcs(
        &mut topology,
        (loose.tails.as_slice(), loose.heads.as_slice()),
        &everyone,
        &disjoint,
        ("external", pool_size, policy),
        &mut stats,
        rng,
    )?;
    debug!(
        arcs = topology.num_arcs(),
        added = stats.added,
        dropped = stats.dropped,
        rerouted = stats.rerouted,
        "arc matching complete"
    );
    Ok((topology, stats))
}

/// Pairs tails with heads, starting over up to [`POOL_RESTARTS`] times; keeps
/// the attempt with the fewest leftovers.
fn match_arcs<F>(
    topology: &mut DirectedTopology,
    tails: &[usize],
    heads: &[usize],
    allowed: &F,
    rng: &mut RngHandle,
) -> ArcMatching
where
    F: Fn(usize, usize) -> bool,
{
    let mut best: Option<ArcMatching> = None;
    for restart in 0..POOL_RESTARTS {
        let attempt = pair_arcs(topology, tails.to_vec(), heads.to_vec(), allowed, rng);
        if attempt.unresolved() == 0 {
            if restart > 0 {
                debug!(restart, arcs = attempt.placed.len(), "arc pool matched after restart");
            }
            return attempt;
        }
        for &[tail, head] in &attempt.placed {
            topology.remove_arc(tail, head);
        }
        if best
            .as_ref()
            .map_or(true, |kept| attempt.unresolved() < kept.unresolved())
        {
            best = Some(attempt);
        }
    }
    let best = best.unwrap_or_default();
    for &[tail, head] in &best.placed {
        topology.add_arc(tail, head);
    }
    best
}

fn pair_arcs<F>(
    topology: &mut DirectedTopology,
    mut tails: Vec<usize>,
    mut heads: Vec<usize>,
    allowed: &F,
    rng: &mut RngHandle,
) -> ArcMatching
where
    F: Fn(usize, usize) -> bool,
{
    let mut placed: Vec<[usize; 2]> = Vec::with_capacity(tails.len());
    let mut extra_tails = tails.split_off(tails.len().min(heads.len()));
    let mut extra_heads = heads.split_off(tails.len());
    for _ in 0..RESHUFFLE_ROUNDS {
        if tails.is_empty() {
            break;
        }
        heads.shuffle(rng);
        let mut rejected_tails = Vec::new();
        let mut rejected_heads = Vec::new();
        for (&tail, &head) in tails.iter().zip(&heads) {
            if allowed(tail, head) && topology.add_arc(tail, head) {
                placed.push([tail, head]);
            } else {
                rejected_tails.push(tail);
                rejected_heads.push(head);
            }
        }
        tails = rejected_tails;
        heads = rejected_heads;
    }

    for (tail, head) in tails.into_iter().zip(heads) {
        if !switch_arc(topology, &mut placed, tail, head, allowed, rng) {
            extra_tails.push(tail);
            extra_heads.push(head);
        }
    }
    ArcMatching {
        placed,
        tails: extra_tails,
        heads: extra_heads,
    }
}

/// Replaces a placed arc `a -> b` by `tail -> b` and `a -> head`.
fn switch_arc<F>(
    topology: &mut DirectedTopology,
    placed: &mut Vec<[usize; 2]>,
    tail: usize,
    head: usize,
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
        let [a, b] = placed[index];
        if tail == a || head == b || tail == b || head == a {
            continue;
        }
        if !allowed(tail, b) || !allowed(a, head) {
            continue;
        }
        if topology.contains(tail, b) || topology.contains(a, head) {
            continue;
        }
        topology.remove_arc(a, b);
        topology.add_arc(tail, b);
        topology.add_arc(a, head);
        placed[index] = [tail, b];
        placed.push([a, head]);
        return true;
    }
    false
}

fn resolve_arcs<F>(
    topology: &mut DirectedTopology,
    (tails, heads): (&[usize], &[usize]),
    partners: &[usize],
    allowed: &F,
    (label, pool_size, policy): (&str, usize, RoundingPolicy),
    stats: &mut WiringStats,
    rng: &mut RngHandle,
) -> Result<(), GraphGenError>
where
    F: Fn(usize, usize) -> bool,
{
    let unresolved = tails.len() + heads.len();
    if unresolved == 0 {
        return Ok(());
    }
    if unresolved > unresolved_limit(pool_size) {
        return Err(unmatched_error(label, unresolved, pool_size));
    }
    let mut attach = |stub: usize, outgoing: bool, topology: &mut DirectedTopology| {
        if attaches(policy, rng) {
            let mut shuffled = partners.to_vec();
            shuffled.shuffle(rng);
            let arc = shuffled
                .into_iter()
                .map(|w| if outgoing { (stub, w) } else { (w, stub) })
                .find(|&(t, h)| allowed(t, h) && topology.can_add(t, h));
            if let Some((t, h)) = arc {
                topology.add_arc(t, h);
                stats.added += 1;
                return;
            }
        }
        stats.dropped += 1;
    };
    for &tail in tails {
        attach(tail, true, &mut *topology);
    }
    for &head in heads {
        attach(head, false, &mut *topology);
    }
    warn!(pool = label, unresolved, "arc stubs left unmatched after switching");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_of_communities() -> Assignment {
        Assignment {
            memberships: (0..8).map(|node| vec![node / 4]).collect(),
            demands: vec![vec![2]; 8],
            sizes: vec![4, 4],
        }
    }

    #[test]
    fn nearest_balance_keeps_degrees() {
        let assignment = pair_of_communities();
        let outs = vec![3; 8];
        let ins = vec![3; 8];
        let out_slots = vec![vec![2], vec![2], vec![2], vec![1], vec![2], vec![2], vec![2], vec![2]];
        let in_slots = vec![vec![2]; 8];
        let mut budget = DirectedBudget::new(&outs, &ins, out_slots, in_slots);
        let ideal_out = vec![2.0, 2.0, 2.0, 1.7, 2.0, 2.0, 2.0, 2.0];
        let ideal_in = vec![2.0; 8];
        let mut rng = RngHandle::from_seed(12);
        budget.balance(
            &assignment,
            IdealShares {
                outgoing: &ideal_out,
                incoming: &ideal_in,
            },
            RoundingPolicy::Nearest,
            &mut rng,
        )
        .unwrap();
        assert_eq!(budget.outgoing.internal[3], vec![2]);
        assert_eq!(budget.outgoing.external[3], 1);
        assert_eq!(budget.added + budget.dropped, 0);
        let out_ext: usize = budget.outgoing.external.iter().sum();
        let in_ext: usize = budget.incoming.external.iter().sum();
        assert_eq!(out_ext, in_ext);
    }

    #[test]
    fn external_balance_stops_at_its_move_limit() {
        let assignment = Assignment {
            memberships: vec![vec![0], vec![1]],
            demands: vec![vec![0], vec![0]],
            sizes: vec![1, 1],
        };
        let mut budget = DirectedBudget::new(
            &[BALANCE_MOVE_LIMIT + 1, 0],
            &[0, 0],
            vec![vec![0], vec![0]],
            vec![vec![0], vec![0]],
        );
        let ideal = vec![0.0; 2];
        let mut rng = RngHandle::from_seed(14);
        let shares = IdealShares {
            outgoing: &ideal,
            incoming: &ideal,
        };
        match budget.balance(&assignment, shares, RoundingPolicy::Defect, &mut rng) {
            Err(GraphGenError::Convergence(info)) => {
                assert_eq!(info.code, "arc-balance");
                assert_eq!(info.context["pool"], "external");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(budget.dropped, BALANCE_MOVE_LIMIT);
    }

    #[test]
    fn arcs_respect_pools() {
        let assignment = pair_of_communities();
        let degrees = vec![3; 8];
        let mut budget = DirectedBudget::new(&degrees, &degrees, vec![vec![2]; 8], vec![vec![2]; 8]);
        let ideal = vec![2.0; 8];
        let mut rng = RngHandle::from_seed(13);
        budget.balance(
            &assignment,
            IdealShares {
                outgoing: &ideal,
                incoming: &ideal,
            },
            RoundingPolicy::Nearest,
            &mut rng,
        )
        .unwrap();
        let (topology, stats) =
            wire_directed(&budget, &assignment, RoundingPolicy::Nearest, &mut rng).unwrap();
        assert_eq!(stats.added, 0);
        for [tail, head] in topology.arcs() {
            assert_ne!(tail, head);
        }
        for node in 0..8 {
            assert!(topology.out_degree(node) <= 3);
            assert!(topology.in_degree(node) <= 3);
        }
    }
}
