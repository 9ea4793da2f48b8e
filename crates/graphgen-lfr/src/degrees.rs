//! Power-law degree sequences.

use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::powerlaw::PowerLaw;
use graphgen_core::rng::RngHandle;
use rand::Rng;

/// Rejection draws tried before scanning for an adjustable node.
const ADJUST_PROBES: usize = 64;
/// Unit steps `adjust_total` may take before giving up.
pub const ADJUST_STEP_LIMIT: usize = 1_000_000;

/// Degree sequence together with the distribution it was drawn from.
#[derive(Debug, Clone)]
pub struct DegreeSequence {
    /// Degree per node.
    pub degrees: Vec<usize>,
    /// Truncated power law whose lower cut-off was solved for the mean.
    pub distribution: PowerLaw,
}

impl DegreeSequence {
    /// Sum of all degrees.
    pub fn total(&self) -> usize {
        self.degrees.iter().sum()
    }
}

/// Samples `num_nodes` degrees from `x^-tau` on `[low, max_degree]`.
///
/// The lower cut-off is solved so the continuous mean equals `average_k`.
/// Rounded draws are then nudged by single units on random nodes until the
/// total equals `round(average_k * num_nodes)`, made even when `even` is set.
pub fn sample_degree_sequence(
    num_nodes: usize,
    average_k: f64,
    max_degree: usize,
    tau: f64,
    even: bool,
    rng: &mut RngHandle,
) -> Result<DegreeSequence, GraphGenError> {
    if max_degree >= num_nodes {
        return Err(GraphGenError::Configuration(
            ErrorInfo::new(
                "max-degree-range",
                "max_degree must be smaller than num_nodes",
            )
            .with_context("max_degree", max_degree)
            .with_context("num_nodes", num_nodes),
        ));
    }
    let distribution = PowerLaw::with_mean(tau, max_degree as f64, average_k)?;
    let mut degrees: Vec<usize> = (0..num_nodes)
        .map(|_| distribution.sample_rounded(rng).min(max_degree))
        .collect();

    let capacity = num_nodes * max_degree;
    let mut target = ((average_k * num_nodes as f64).round() as usize).clamp(num_nodes, capacity);
    if even && target % 2 == 1 {
        target = if target < capacity {
            target + 1
        } else {
            target - 1
        };
    }
    adjust_total(&mut degrees, target, 1, max_degree, rng)?;
    Ok(DegreeSequence {
        degrees,
        distribution,
    })
}

/// Samples independent in- and out-degree sequences with equal totals.
pub fn sample_directed_sequences(
    num_nodes: usize,
    average_k: f64,
    max_degree: usize,
    tau: f64,
    rng: &mut RngHandle,
) -> Result<(DegreeSequence, DegreeSequence), GraphGenError> {
    let in_degrees = sample_degree_sequence(num_nodes, average_k, max_degree, tau, false, rng)?;
    let mut out_degrees =
        sample_degree_sequence(num_nodes, average_k, max_degree, tau, false, rng)?;
    let in_total = in_degrees.total();
    adjust_total(&mut out_degrees.degrees, in_total, 1, max_degree, rng)?;
    Ok((in_degrees, out_degrees))
}

/// Moves `values` to sum `target` by `±1` steps on random entries kept in `[floor, ceiling]`.
pub(crate) fn adjust_total(
    values: &mut [usize],
    target: usize,
    floor: usize,
    ceiling: usize,
    rng: &mut RngHandle,
) -> Result<(), GraphGenError> {
    let mut total: usize = values.iter().sum();
    for _ in 0..ADJUST_STEP_LIMIT {
        if total == target {
            return Ok(());
        }
        let raise = total < target;
        let adjustable = |value: usize| {
            if raise {
                value < ceiling
            } else {
                value > floor
            }
        };
        let Some(index) = pick_adjustable(values, adjustable, rng) else {
            return Err(GraphGenError::Convergence(
                ErrorInfo::new("degree-total", "degree total cannot reach its target")
                    .with_context("total", total)
                    .with_context("target", target),
            ));
        };
        if raise {
            values[index] += 1;
            total += 1;
        } else {
            values[index] -= 1;
            total -= 1;
        }
    }
    if total == target {
        return Ok(());
    }
    Err(GraphGenError::Convergence(
        ErrorInfo::new("degree-total", "degree total adjustment exceeded its step limit")
            .with_context("steps", ADJUST_STEP_LIMIT)
            .with_context("total", total)
            .with_context("target", target),
    ))
}

fn pick_adjustable(
    values: &[usize],
    adjustable: impl Fn(usize) -> bool,
    rng: &mut RngHandle,
) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    for _ in 0..ADJUST_PROBES {
        let index = rng.gen_range(0..values.len());
        if adjustable(values[index]) {
            return Some(index);
        }
    }
    let candidates: Vec<usize> = (0..values.len())
        .filter(|&index| adjustable(values[index]))
        .collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}
