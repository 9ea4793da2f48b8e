//! Community size sampling.

use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::powerlaw::PowerLaw;
use graphgen_core::rng::RngHandle;
use rand::Rng;
use tracing::debug;

use crate::config::LfrConfig;

/// Size sequences drawn before giving up.
pub const SIZE_ATTEMPTS: usize = 1000;

/// Inclusive bounds on community sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRange {
    /// Smallest community size.
    pub min: usize,
    /// Largest community size.
    pub max: usize,
}

/// Resolves the community size bounds.
///
/// With `fixed_range` the configured bounds are used. Otherwise the bounds
/// follow the degree distribution: `[max(ceil(low), 3), max_degree]`.
pub fn size_range(config: &LfrConfig, degree_law: &PowerLaw) -> Result<SizeRange, GraphGenError> {
    let range = if config.fixed_range {
        SizeRange {
            min: config.com_size_min,
            max: config.com_size_max,
        }
    } else {
        SizeRange {
            min: (degree_law.low().ceil() as usize).max(3),
            max: config.max_degree,
        }
    };
    if range.min == 0 || range.min > range.max {
        return Err(GraphGenError::Configuration(
            ErrorInfo::new("community-range", "community size bounds are empty")
                .with_context("min", range.min)
                .with_context("max", range.max),
        ));
    }
    if range.min > config.num_nodes {
        return Err(GraphGenError::Configuration(
            ErrorInfo::new(
                "community-min-exceeds-nodes",
                "smallest community is larger than the graph",
            )
            .with_context("min", range.min)
            .with_context("num_nodes", config.num_nodes),
        ));
    }
    Ok(range)
}

/// Draws community sizes from `x^-tau2` on `range` summing to `total_slots`.
///
/// A draw is accepted when it has at least `min_communities` entries and can
/// host every slot demand: each slot needs a community strictly larger than
/// its internal stub count.
pub fn sample_community_sizes(
    range: SizeRange,
    tau2: f64,
    total_slots: usize,
    min_communities: usize,
    demands: &[usize],
    rng: &mut RngHandle,
) -> Result<Vec<usize>, GraphGenError> {
    let law = PowerLaw::new(tau2, range.min as f64, range.max as f64)?;
    let mut sorted_demands = demands.to_vec();
    sorted_demands.sort_unstable_by(|a, b| b.cmp(a));

    for attempt in 0..SIZE_ATTEMPTS {
        let Some(sizes) = draw_sizes(&law, range, total_slots, rng) else {
            continue;
        };
        if sizes.len() < min_communities || !can_host(&sizes, &sorted_demands) {
            continue;
        }
        debug!(attempt, communities = sizes.len(), "community sizes accepted");
        return Ok(sizes);
    }
    Err(GraphGenError::Convergence(
        ErrorInfo::new(
            "community-sizes",
            "no community size sequence could host the internal degrees",
        )
        .with_context("attempts", SIZE_ATTEMPTS)
        .with_context("total_slots", total_slots)
        .with_context("min_communities", min_communities),
    ))
}

fn draw_sizes(
    law: &PowerLaw,
    range: SizeRange,
    total_slots: usize,
    rng: &mut RngHandle,
) -> Option<Vec<usize>> {
    let mut sizes = Vec::new();
    let mut sum = 0usize;
    while sum < total_slots {
        let size = law.sample_rounded(rng).clamp(range.min, range.max);
        if sum + size > total_slots {
            break;
        }
        sizes.push(size);
        sum += size;
    }
    let remainder = total_slots - sum;
    if remainder == 0 {
        return Some(sizes);
    }
    if remainder >= range.min {
        sizes.push(remainder);
        return Some(sizes);
    }
    for _ in 0..remainder {
        let open: Vec<usize> = (0..sizes.len())
            .filter(|&index| sizes[index] < range.max)
            .collect();
        if open.is_empty() {
            return None;
        }
        sizes[open[rng.gen_range(0..open.len())]] += 1;
    }
    Some(sizes)
}

/// Hall-style check: for every demand `d`, the slots demanding at least `d`
/// fit into communities larger than `d`.
pub(crate) fn can_host(sizes: &[usize], sorted_demands: &[usize]) -> bool {
    let mut sorted_sizes = sizes.to_vec();
    sorted_sizes.sort_unstable_by(|a, b| b.cmp(a));
    let mut capacity = 0usize;
    let mut next = 0usize;
    for (index, &demand) in sorted_demands.iter().enumerate() {
        while next < sorted_sizes.len() && sorted_sizes[next] > demand {
            capacity += sorted_sizes[next];
            next += 1;
        }
        if index + 1 > capacity {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_cover_every_slot() {
        let mut rng = RngHandle::from_seed(11);
        let range = SizeRange { min: 10, max: 30 };
        let demands = vec![5; 128];
        let sizes = sample_community_sizes(range, 1.0, 128, 1, &demands, &mut rng).unwrap();
        assert_eq!(sizes.iter().sum::<usize>(), 128);
        assert!(sizes.iter().all(|&s| (10..=30).contains(&s)));
    }

    #[test]
    fn hosting_check_counts_large_demands() {
        assert!(can_host(&[5, 5], &[4, 4, 4, 4, 4, 1]));
        assert!(!can_host(&[5, 5], &[5, 1]));
        assert!(!can_host(&[6, 3], &[4, 4, 4, 4, 4, 4, 4]));
    }

    #[test]
    fn unreachable_community_count_fails_to_converge() {
        let mut rng = RngHandle::from_seed(2);
        let range = SizeRange { min: 10, max: 20 };
        let err = sample_community_sizes(range, 1.0, 40, 5, &[1; 40], &mut rng).unwrap_err();
        match err {
            GraphGenError::Convergence(info) => assert_eq!(info.code, "community-sizes"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
