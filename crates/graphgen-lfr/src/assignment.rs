//! Placement of node slots into communities.

use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::rng::RngHandle;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use tracing::{debug, warn};

/// Full assignment passes attempted before giving up.
pub const ASSIGNMENT_ATTEMPTS: usize = 64;

/// Community memberships together with the internal stub demand of each slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Community ids per node, primary first.
    pub memberships: Vec<Vec<usize>>,
    /// Internal stubs per node, aligned with `memberships`.
    pub demands: Vec<Vec<usize>>,
    /// Community sizes indexed by community id.
    pub sizes: Vec<usize>,
}

impl Assignment {
    /// Members of every community, in ascending node order.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.sizes.len()];
        for (node, communities) in self.memberships.iter().enumerate() {
            for &community in communities {
                members[community].push(node);
            }
        }
        members
    }

    /// Slot index of `community` in `node`'s membership list.
    pub fn slot_of(&self, node: usize, community: usize) -> Option<usize> {
        self.memberships[node]
            .iter()
            .position(|&held| held == community)
    }
}

/// Marks `count` distinct nodes, chosen uniformly, as overlapping.
pub fn choose_overlapping(num_nodes: usize, count: usize, rng: &mut RngHandle) -> Vec<bool> {
    let mut flags = vec![false; num_nodes];
    for node in index::sample(rng, num_nodes, count.min(num_nodes)) {
        flags[node] = true;
    }
    flags
}

/// Splits an internal degree into `slots` near-equal parts, largest first.
pub fn split_demand(internal: usize, slots: usize) -> Vec<usize> {
    let slots = slots.max(1);
    let base = internal / slots;
    let extra = internal % slots;
    (0..slots)
        .map(|slot| base + usize::from(slot < extra))
        .collect()
}

/// Per-node slot demands for the given internal degrees.
pub fn slot_demands(internal: &[usize], overlapping: &[bool], membership: usize) -> Vec<Vec<usize>> {
    internal
        .iter()
        .zip(overlapping)
        .map(|(&stubs, &overlaps)| split_demand(stubs, if overlaps { membership } else { 1 }))
        .collect()
}

/// Erdős–Gallai test on a degree sequence, ignoring the parity of its sum.
///
/// Parity is settled later by the stub budget; what matters here is that no
/// group of members demands more internal edges than the rest can absorb.
pub fn is_graphical(degrees: &[usize]) -> bool {
    let mut sorted = degrees.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let mut prefix = 0usize;
    for k in 1..=sorted.len() {
        prefix += sorted[k - 1];
        let absorbed: usize = sorted[k..].iter().map(|&d| d.min(k)).sum();
        if prefix > k * (k - 1) + absorbed {
            return false;
        }
    }
    true
}

/// Number of communities whose internal demand sequence is not graphical.
fn strained_communities(
    demands: &[Vec<usize>],
    memberships: &[Vec<usize>],
    communities: usize,
) -> usize {
    let mut sequences = vec![Vec::new(); communities];
    for (held, slots) in memberships.iter().zip(demands) {
        for (&community, &demand) in held.iter().zip(slots) {
            sequences[community].push(demand);
        }
    }
    sequences
        .iter()
        .filter(|sequence| !is_graphical(sequence))
        .count()
}

/// Places every node slot into a community.
///
/// Nodes are visited by decreasing largest demand over a random order. Each
/// slot joins a community that is strictly larger than its demand, still has
/// room, and is not yet held by the node; among those the choice is weighted
/// by remaining room. A dead end restarts the whole pass, and so does a
/// placement leaving some community with a non-graphical demand sequence.
/// When every pass is strained the placement with the fewest strained
/// communities is kept; the wiring stage moves their surplus outside.
pub fn assign_communities(
    demands: &[Vec<usize>],
    sizes: &[usize],
    rng: &mut RngHandle,
) -> Result<Assignment, GraphGenError> {
    let build = |memberships: Vec<Vec<usize>>| Assignment {
        memberships,
        demands: demands.to_vec(),
        sizes: sizes.to_vec(),
    };
    let mut closest: Option<(usize, Vec<Vec<usize>>)> = None;
    for attempt in 0..ASSIGNMENT_ATTEMPTS {
        let Some(memberships) = try_assign(demands, sizes, rng) else {
            continue;
        };
        let strained = strained_communities(demands, &memberships, sizes.len());
        if strained == 0 {
            debug!(attempt, communities = sizes.len(), "membership assignment complete");
            return Ok(build(memberships));
        }
        if closest.as_ref().map_or(true, |(fewest, _)| strained < *fewest) {
            closest = Some((strained, memberships));
        }
    }
    if let Some((strained, memberships)) = closest {
        warn!(strained, "no placement kept every community graphical");
        return Ok(build(memberships));
    }
    Err(GraphGenError::Convergence(
        ErrorInfo::new("assignment", "nodes could not be placed into communities")
            .with_context("attempts", ASSIGNMENT_ATTEMPTS)
            .with_context("communities", sizes.len()),
    ))
}

fn try_assign(
    demands: &[Vec<usize>],
    sizes: &[usize],
    rng: &mut RngHandle,
) -> Option<Vec<Vec<usize>>> {
    let mut order: Vec<usize> = (0..demands.len()).collect();
    order.shuffle(rng);
    order.sort_by_key(|&node| std::cmp::Reverse(demands[node].iter().copied().max().unwrap_or(0)));

    let mut room = sizes.to_vec();
    let mut memberships = vec![Vec::new(); demands.len()];
    for node in order {
        for &demand in &demands[node] {
            let held: &Vec<usize> = &memberships[node];
            let candidates: Vec<usize> = (0..sizes.len())
                .filter(|&c| room[c] > 0 && sizes[c] > demand && !held.contains(&c))
                .collect();
            let total_room: usize = candidates.iter().map(|&c| room[c]).sum();
            if total_room == 0 {
                return None;
            }
            let mut ticket = rng.gen_range(0..total_room);
            let mut chosen = candidates[candidates.len() - 1];
            for &c in &candidates {
                if ticket < room[c] {
                    chosen = c;
                    break;
                }
                ticket -= room[c];
            }
            room[chosen] -= 1;
            memberships[node].push(chosen);
        }
    }
    Some(memberships)
}
