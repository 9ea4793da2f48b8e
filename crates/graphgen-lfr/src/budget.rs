//! Internal/external stub budgets and their parity repair.

use graphgen_core::rng::RngHandle;
use rand::Rng;
use tracing::debug;

use crate::assignment::Assignment;
use crate::config::RoundingPolicy;

/// Exact (fractional) internal share of a degree.
pub fn ideal_internal(degree: usize, mu: f64) -> f64 {
    (1.0 - mu) * degree as f64
}

/// Integer internal share of a degree under `policy`.
///
/// `RandomF` rounds up with probability equal to the fractional part; every
/// other policy rounds to the nearest integer and leaves the parity
/// decision to [`StubBudget::repair_parity`].
pub fn split_internal(degree: usize, mu: f64, policy: RoundingPolicy, rng: &mut RngHandle) -> usize {
    let ideal = ideal_internal(degree, mu);
    let internal = match policy {
        RoundingPolicy::RandomF => {
            let floor = ideal.floor();
            if rng.gen::<f64>() < ideal - floor {
                floor + 1.0
            } else {
                floor
            }
        }
        _ => ideal.round(),
    };
    (internal.max(0.0) as usize).min(degree)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParityFix {
    Shift,
    Add,
    Remove,
}

pub(crate) fn parity_fix(policy: RoundingPolicy, rng: &mut RngHandle) -> ParityFix {
    match policy {
        RoundingPolicy::Nearest => ParityFix::Shift,
        RoundingPolicy::Excess => ParityFix::Add,
        RoundingPolicy::Defect => ParityFix::Remove,
        RoundingPolicy::RandomF => {
            if rng.gen_bool(0.5) {
                ParityFix::Add
            } else {
                ParityFix::Remove
            }
        }
    }
}

/// Internal and external stub counts per node, ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubBudget {
    /// Internal stubs per node, aligned with the node's memberships.
    pub internal: Vec<Vec<usize>>,
    /// External stubs per node.
    pub external: Vec<usize>,
    /// Stubs created while repairing parity.
    pub added: usize,
    /// Stubs removed while repairing parity.
    pub dropped: usize,
}

impl StubBudget {
    /// Derives external stubs as the degree left after the internal slots.
    pub fn new(degrees: &[usize], assignment: &Assignment) -> Self {
        let external = degrees
            .iter()
            .zip(&assignment.demands)
            .map(|(&degree, slots)| degree.saturating_sub(slots.iter().sum()))
            .collect();
        Self {
            internal: assignment.demands.clone(),
            external,
            added: 0,
            dropped: 0,
        }
    }

    /// Internal stubs of `node` over all of its communities.
    pub fn internal_total(&self, node: usize) -> usize {
        self.internal[node].iter().sum()
    }

    /// Planned degree of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.internal_total(node) + self.external[node]
    }

    /// Makes every community's internal stub total even, then the external total.
    ///
    /// `ideal` holds the fractional internal share of every node; `Nearest`
    /// moves one stub between the internal and external budgets of the member
    /// whose rounding strayed furthest from that share, keeping its degree.
    pub fn repair_parity(
        &mut self,
        assignment: &Assignment,
        ideal: &[f64],
        policy: RoundingPolicy,
        rng: &mut RngHandle,
    ) {
        for (community, members) in assignment.members().iter().enumerate() {
            let slots: Vec<(usize, usize)> = members
                .iter()
                .filter_map(|&node| assignment.slot_of(node, community).map(|slot| (node, slot)))
                .collect();
            let total: usize = slots
                .iter()
                .map(|&(node, slot)| self.internal[node][slot])
                .sum();
            if total % 2 == 0 {
                continue;
            }
            let size = assignment.sizes[community];
            let applied = match parity_fix(policy, rng) {
                ParityFix::Shift => self.shift_closest(&slots, size, ideal),
                ParityFix::Add => self.add_internal(&slots, size, rng),
                ParityFix::Remove => false,
            };
            if !applied {
                self.remove_internal(&slots, rng);
            }
            debug!(community, "internal stub parity repaired");
        }
        self.repair_external_parity(policy, rng);
    }

    fn shift_closest(&mut self, slots: &[(usize, usize)], size: usize, ideal: &[f64]) -> bool {
        let mut best: Option<(f64, usize, usize, bool)> = None;
        for &(node, slot) in slots {
            let residual = ideal[node] - self.internal_total(node) as f64;
            if self.external[node] > 0
                && self.internal[node][slot] + 1 < size
                && best.map_or(true, |(score, ..)| residual > score)
            {
                best = Some((residual, node, slot, true));
            }
            if self.internal[node][slot] > 0 && best.map_or(true, |(score, ..)| -residual > score)
            {
                best = Some((-residual, node, slot, false));
            }
        }
        let Some((_, node, slot, inward)) = best else {
            return false;
        };
        if inward {
            self.internal[node][slot] += 1;
            self.external[node] -= 1;
        } else {
            self.internal[node][slot] -= 1;
            self.external[node] += 1;
        }
        true
    }

    fn add_internal(&mut self, slots: &[(usize, usize)], size: usize, rng: &mut RngHandle) -> bool {
        let open: Vec<(usize, usize)> = slots
            .iter()
            .copied()
            .filter(|&(node, slot)| self.internal[node][slot] + 1 < size)
            .collect();
        if open.is_empty() {
            return false;
        }
        let (node, slot) = open[rng.gen_range(0..open.len())];
        self.internal[node][slot] += 1;
        self.added += 1;
        true
    }

    fn remove_internal(&mut self, slots: &[(usize, usize)], rng: &mut RngHandle) {
        let filled: Vec<(usize, usize)> = slots
            .iter()
            .copied()
            .filter(|&(node, slot)| self.internal[node][slot] > 0)
            .collect();
        if filled.is_empty() {
            return;
        }
        let (node, slot) = filled[rng.gen_range(0..filled.len())];
        self.internal[node][slot] -= 1;
        self.dropped += 1;
    }

    fn repair_external_parity(&mut self, policy: RoundingPolicy, rng: &mut RngHandle) {
        let total: usize = self.external.iter().sum();
        if total % 2 == 0 {
            return;
        }
        let grow = match parity_fix(policy, rng) {
            ParityFix::Add => true,
            ParityFix::Shift | ParityFix::Remove => false,
        };
        if grow && !self.external.is_empty() {
            let node = rng.gen_range(0..self.external.len());
            self.external[node] += 1;
            self.added += 1;
            return;
        }
        let filled: Vec<usize> = (0..self.external.len())
            .filter(|&node| self.external[node] > 0)
            .collect();
        if filled.is_empty() {
            return;
        }
        let node = filled[rng.gen_range(0..filled.len())];
        self.external[node] -= 1;
        self.dropped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_communities() -> Assignment {
        Assignment {
            memberships: vec![vec![0], vec![0], vec![0], vec![1], vec![1], vec![1]],
            demands: vec![vec![2], vec![1], vec![2], vec![2], vec![2], vec![2]],
            sizes: vec![3, 3],
        }
    }

    #[test]
    fn random_split_stays_between_floor_and_ceiling() {
        let mut rng = RngHandle::from_seed(1);
        for degree in 1..40 {
            let internal = split_internal(degree, 0.3, RoundingPolicy::RandomF, &mut rng);
            let ideal = ideal_internal(degree, 0.3);
            assert!(internal as f64 >= ideal.floor() && internal as f64 <= ideal.ceil());
        }
        assert_eq!(split_internal(10, 0.25, RoundingPolicy::Nearest, &mut rng), 8);
    }

    #[test]
    fn nearest_repair_keeps_degrees() {
        let assignment = two_communities();
        let degrees = vec![3, 3, 3, 3, 3, 3];
        let mut budget = StubBudget::new(&degrees, &assignment);
        let ideal = vec![2.0, 1.6, 2.0, 2.0, 2.0, 2.0];
        let mut rng = RngHandle::from_seed(2);
        budget.repair_parity(&assignment, &ideal, RoundingPolicy::Nearest, &mut rng);
        assert_eq!(budget.internal[1], vec![2]);
        assert_eq!(budget.external[1], 1);
        for node in 0..6 {
            assert_eq!(budget.degree(node), 3);
        }
        assert_eq!(budget.added + budget.dropped, 0);
    }

    #[test]
    fn excess_and_defect_change_totals() {
        let assignment = two_communities();
        let degrees = vec![3, 3, 3, 3, 3, 3];
        let ideal = vec![2.0; 6];
        let mut rng = RngHandle::from_seed(3);

        let mut excess = StubBudget::new(&degrees, &assignment);
        excess.repair_parity(&assignment, &ideal, RoundingPolicy::Excess, &mut rng);
        assert_eq!(excess.internal.iter().flatten().take(3).sum::<usize>(), 6);
        assert_eq!(excess.external.iter().sum::<usize>() % 2, 0);
        assert_eq!(excess.added, 2);

        let mut defect = StubBudget::new(&degrees, &assignment);
        defect.repair_parity(&assignment, &ideal, RoundingPolicy::Defect, &mut rng);
        assert_eq!(defect.internal.iter().flatten().take(3).sum::<usize>(), 4);
        assert_eq!(defect.external.iter().sum::<usize>() % 2, 0);
        assert_eq!(defect.dropped, 2);
    }
}
