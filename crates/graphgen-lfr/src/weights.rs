//! Strength-driven edge weights.
//!
//! Every node gets a target strength `s = k^STRENGTH_EXPONENT` split into an
//! internal share `(1 - muw) s` and an external share `muw s`. Raw weights
//! drawn from `x^-beta` seed the edges and an iterative proportional fit
//! pulls both shares of every node towards their targets.

use graphgen_core::errors::GraphGenError;
use graphgen_core::shares_community;
use graphgen_core::powerlaw::PowerLaw;
use graphgen_core::rng::RngHandle;
use tracing::{debug, warn};

use crate::config::WeightConfig;

/// Exponent relating target strength to degree.
pub const STRENGTH_EXPONENT: f64 = 1.5;
/// Upper end of the raw weight support `[1, WEIGHT_SPREAD]`.
pub const WEIGHT_SPREAD: f64 = 10.0;
/// Proportional fitting rounds.
pub const FIT_ROUNDS: usize = 200;
/// Largest relative share error at which fitting stops early.
pub const FIT_TOLERANCE: f64 = 1e-3;
/// Smallest share kept on a side a node actually has.
const MIN_SHARE: f64 = 1e-3;

/// Edge weights aligned with the input edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightOutcome {
    /// Positive weight per edge.
    pub weights: Vec<f64>,
    /// Largest relative deviation of any node share from its target.
    pub fit_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Internal = 0,
    External = 1,
}

/// Assigns a positive weight to every edge (or arc).
///
/// Arcs count as incidences of both endpoints, so the directed families use
/// the same fit on total strength.
pub fn assign_weights(
    num_nodes: usize,
    edges: &[[usize; 2]],
    memberships: &[Vec<usize>],
    config: &WeightConfig,
    rng: &mut RngHandle,
) -> Result<WeightOutcome, GraphGenError> {
    config.validate()?;
    if edges.is_empty() {
        return Ok(WeightOutcome {
            weights: Vec::new(),
            fit_error: 0.0,
        });
    }
    let sides: Vec<Side> = edges
        .iter()
        .map(|&[u, v]| {
            if shares_community(&memberships[u], &memberships[v]) {
                Side::Internal
            } else {
                Side::External
            }
        })
        .collect();
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
    for (index, &[u, v]) in edges.iter().enumerate() {
        incident[u].push(index);
        incident[v].push(index);
    }
    let targets = side_targets(&incident, &sides, config.muw);

    let law = PowerLaw::new(config.beta, 1.0, WEIGHT_SPREAD)?;
    let mut proposals = vec![0.0f64; edges.len()];
    for (node, list) in incident.iter().enumerate() {
        for side in [Side::Internal, Side::External] {
            let members: Vec<usize> = list
                .iter()
                .copied()
                .filter(|&edge| sides[edge] == side)
                .collect();
            if members.is_empty() {
                continue;
            }
            let raw: Vec<f64> = members.iter().map(|_| law.sample(rng)).collect();
            let scale = targets[node][side as usize] / raw.iter().sum::<f64>();
            for (&edge, value) in members.iter().zip(raw) {
                proposals[edge] += value * scale / 2.0;
            }
        }
    }
    let mut weights = proposals;

    let mut fit_error = share_error(&weights, &incident, &sides, &targets);
    let mut rounds = 0;
    while rounds < FIT_ROUNDS && fit_error > FIT_TOLERANCE {
        let realized = realized_shares(&weights, &incident, &sides);
        for (index, &[u, v]) in edges.iter().enumerate() {
            let side = sides[index] as usize;
            let ratio_u = ratio(targets[u][side], realized[u][side]);
            let ratio_v = ratio(targets[v][side], realized[v][side]);
            weights[index] *= (ratio_u * ratio_v).sqrt();
        }
        fit_error = share_error(&weights, &incident, &sides, &targets);
        rounds += 1;
    }

    let target_total: f64 = targets.iter().map(|t| t[0] + t[1]).sum();
    let realized_total: f64 = weights.iter().map(|w| 2.0 * w).sum();
    if realized_total > 0.0 {
        let factor = target_total / realized_total;
        weights.iter_mut().for_each(|w| *w *= factor);
        fit_error = share_error(&weights, &incident, &sides, &targets);
    }
    if fit_error > FIT_TOLERANCE {
        warn!(fit_error, rounds, "weight fit stopped above tolerance");
    } else {
        debug!(fit_error, rounds, "weight fit converged");
    }
    Ok(WeightOutcome { weights, fit_error })
}

/// Target internal and external strength per node.
fn side_targets(incident: &[Vec<usize>], sides: &[Side], muw: f64) -> Vec<[f64; 2]> {
    incident
        .iter()
        .map(|list| {
            let strength = (list.len() as f64).powf(STRENGTH_EXPONENT);
            let has_internal = list.iter().any(|&e| sides[e] == Side::Internal);
            let has_external = list.iter().any(|&e| sides[e] == Side::External);
            match (has_internal, has_external) {
                (true, true) => {
                    let external = muw.clamp(MIN_SHARE, 1.0 - MIN_SHARE);
                    [(1.0 - external) * strength, external * strength]
                }
                (true, false) => [strength, 0.0],
                (false, true) => [0.0, strength],
                (false, false) => [0.0, 0.0],
            }
        })
        .collect()
}

fn realized_shares(weights: &[f64], incident: &[Vec<usize>], sides: &[Side]) -> Vec<[f64; 2]> {
    incident
        .iter()
        .map(|list| {
            let mut shares = [0.0, 0.0];
            for &edge in list {
                shares[sides[edge] as usize] += weights[edge];
            }
            shares
        })
        .collect()
}

fn share_error(
    weights: &[f64],
    incident: &[Vec<usize>],
    sides: &[Side],
    targets: &[[f64; 2]],
) -> f64 {
    realized_shares(weights, incident, sides)
        .iter()
        .zip(targets)
        .flat_map(|(realized, target)| {
            (0..2)
                .filter(|&side| target[side] > 0.0)
                .map(move |side| (realized[side] / target[side] - 1.0).abs())
        })
        .fold(0.0, f64::max)
}

fn ratio(target: f64, realized: f64) -> f64 {
    if realized > 0.0 {
        target / realized
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_graph_fits_exactly() {
        let edges: Vec<[usize; 2]> = (0..5)
            .map(|i| {
                let j = (i + 1) % 5;
                [i.min(j), i.max(j)]
            })
            .collect();
        let memberships = vec![vec![0]; 5];
        let mut rng = RngHandle::from_seed(14);
        let outcome =
            assign_weights(5, &edges, &memberships, &WeightConfig::new(0.3), &mut rng).unwrap();
        assert_eq!(outcome.weights.len(), 5);
        assert!(outcome.fit_error < 1e-2);
        for weight in &outcome.weights {
            assert!(*weight > 0.0);
            assert!((weight - 2f64.powf(1.5) / 2.0).abs() < 0.05);
        }
    }

    #[test]
    fn empty_edge_list_has_no_weights() {
        let mut rng = RngHandle::from_seed(1);
        let memberships = vec![vec![0]; 3];
        let outcome =
            assign_weights(3, &[], &memberships, &WeightConfig::new(0.1), &mut rng).unwrap();
        assert!(outcome.weights.is_empty());
    }

    #[test]
    fn invalid_muw_is_rejected() {
        let mut rng = RngHandle::from_seed(1);
        let memberships = vec![vec![0], vec![1]];
        let config = WeightConfig::new(1.5);
        let err = assign_weights(2, &[[0, 1]], &memberships, &config, &mut rng).unwrap_err();
        assert_eq!(err.info().code, "weight-mixing-range");
    }
}
