use graphgen_core::errors::{ErrorInfo, GraphGenError};
use serde::{Deserialize, Serialize};

/// How fractional internal/external splits and unmatched stubs are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingPolicy {
    /// Round to the nearest integer; parity is fixed by moving stubs between budgets.
    #[default]
    Nearest,
    /// Realized degrees may exceed their targets.
    Excess,
    /// Realized degrees may fall short of their targets.
    Defect,
    /// Independent coin flips decide every ambiguous case.
    RandomF,
}

/// Parameters shared by the undirected and directed LFR families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LfrConfig {
    /// Number of nodes; ids are `0..num_nodes`.
    pub num_nodes: usize,
    /// Target mean degree.
    pub average_k: f64,
    /// Largest allowed degree.
    pub max_degree: usize,
    /// Target fraction of each node's edges leaving its communities.
    #[serde(alias = "mut")]
    pub mu: f64,
    /// Smallest community size (used when `fixed_range` is set).
    pub com_size_min: usize,
    /// Largest community size (used when `fixed_range` is set).
    pub com_size_max: usize,
    /// Seed of the single RNG stream.
    pub seed: u64,
    /// Minus exponent of the degree distribution.
    #[serde(default = "default_tau")]
    pub tau: f64,
    /// Minus exponent of the community size distribution.
    #[serde(default = "default_tau2")]
    pub tau2: f64,
    /// Number of nodes belonging to several communities.
    #[serde(default)]
    pub overlapping_nodes: usize,
    /// Number of communities each overlapping node belongs to.
    #[serde(default)]
    pub overlap_membership: usize,
    /// Use `[com_size_min, com_size_max]`; otherwise derive the range from the degrees.
    #[serde(default = "default_fixed_range")]
    pub fixed_range: bool,
    /// Resolution of fractional splits and unmatched stubs.
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

fn default_tau() -> f64 {
    2.0
}

fn default_tau2() -> f64 {
    1.0
}

fn default_fixed_range() -> bool {
    true
}

impl LfrConfig {
    /// Creates a configuration with the documented defaults for every optional field.
    pub fn new(
        num_nodes: usize,
        average_k: f64,
        max_degree: usize,
        mu: f64,
        com_size_min: usize,
        com_size_max: usize,
        seed: u64,
    ) -> Self {
        Self {
            num_nodes,
            average_k,
            max_degree,
            mu,
            com_size_min,
            com_size_max,
            seed,
            tau: default_tau(),
            tau2: default_tau2(),
            overlapping_nodes: 0,
            overlap_membership: 0,
            fixed_range: default_fixed_range(),
            rounding: RoundingPolicy::default(),
        }
    }

    /// Number of memberships held by each overlapping node (1 when there is no overlap).
    pub fn memberships_per_overlap(&self) -> usize {
        if self.overlapping_nodes == 0 {
            1
        } else {
            self.overlap_membership
        }
    }

    /// Total community slots: `num_nodes + overlapping_nodes * (overlap_membership - 1)`.
    pub fn membership_slots(&self) -> usize {
        self.num_nodes + self.overlapping_nodes * (self.memberships_per_overlap() - 1)
    }

    /// Largest community size that the configuration can produce.
    pub fn largest_community_bound(&self) -> usize {
        if self.fixed_range {
            self.com_size_max
        } else {
            self.max_degree
        }
    }

    /// Rejects mutually infeasible parameters before any sampling starts.
    pub fn validate(&self) -> Result<(), GraphGenError> {
        if self.num_nodes < 2 {
            return Err(config_error("num-nodes", "at least two nodes are required")
                .with_context("num_nodes", self.num_nodes));
        }
        if self.max_degree == 0 || self.max_degree >= self.num_nodes {
            return Err(config_error(
                "max-degree-range",
                "max_degree must satisfy 1 <= max_degree < num_nodes",
            )
            .with_context("max_degree", self.max_degree)
            .with_context("num_nodes", self.num_nodes));
        }
        if !self.average_k.is_finite() || self.average_k < 1.0 {
            return Err(config_error("average-below-one", "average_k must be at least 1")
                .with_context("average_k", self.average_k));
        }
        if self.average_k > self.max_degree as f64 {
            return Err(
                config_error("average-above-max", "average_k cannot exceed max_degree")
                    .with_context("average_k", self.average_k)
                    .with_context("max_degree", self.max_degree),
            );
        }
        if !(0.0..=1.0).contains(&self.mu) {
            return Err(config_error("mixing-range", "mu must lie in [0, 1]")
                .with_context("mu", self.mu));
        }
        if !self.tau.is_finite() || !self.tau2.is_finite() {
            return Err(config_error("exponent", "tau and tau2 must be finite")
                .with_context("tau", self.tau)
                .with_context("tau2", self.tau2));
        }
        self.validate_overlap()?;
        self.validate_community_range()
    }

    fn validate_overlap(&self) -> Result<(), GraphGenError> {
        if self.overlapping_nodes > self.num_nodes {
            return Err(config_error(
                "overlap-count",
                "overlapping_nodes cannot exceed num_nodes",
            )
            .with_context("overlapping_nodes", self.overlapping_nodes)
            .with_context("num_nodes", self.num_nodes));
        }
        if self.overlapping_nodes > 0 && self.overlap_membership < 2 {
            return Err(config_error(
                "overlap-membership",
                "overlapping nodes need overlap_membership >= 2",
            )
            .with_context("overlap_membership", self.overlap_membership));
        }
        Ok(())
    }

    fn validate_community_range(&self) -> Result<(), GraphGenError> {
        if self.fixed_range {
            if self.com_size_min == 0 || self.com_size_min > self.com_size_max {
                return Err(config_error(
                    "community-range",
                    "community sizes must satisfy 1 <= com_size_min <= com_size_max",
                )
                .with_context("com_size_min", self.com_size_min)
                .with_context("com_size_max", self.com_size_max));
            }
            if self.com_size_min > self.num_nodes {
                return Err(config_error(
                    "community-min-exceeds-nodes",
                    "com_size_min cannot exceed num_nodes",
                )
                .with_context("com_size_min", self.com_size_min)
                .with_context("num_nodes", self.num_nodes));
            }
            let most_communities = self.membership_slots() / self.com_size_min;
            if self.memberships_per_overlap() > most_communities {
                return Err(config_error(
                    "overlap-membership-too-large",
                    "overlap_membership exceeds the number of communities that fit",
                )
                .with_context("overlap_membership", self.overlap_membership)
                .with_context("max_communities", most_communities));
            }
        }
        let largest_internal = ((1.0 - self.mu) * self.max_degree as f64 - 1e-9).ceil();
        let largest_community = self.largest_community_bound();
        if largest_internal > largest_community.saturating_sub(1) as f64 {
            return Err(config_error(
                "community-too-small",
                "the largest community cannot host the largest internal degree",
            )
            .with_context("internal_degree", largest_internal)
            .with_context("largest_community", largest_community)
            .with_hint("raise com_size_max or mu, or lower max_degree"));
        }
        Ok(())
    }
}

/// Undirected LFR configuration (unweighted and weighted families).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndirectedConfig {
    /// Shared LFR parameters.
    #[serde(flatten)]
    pub lfr: LfrConfig,
    /// Target average clustering coefficient; `None` skips the rewiring pass.
    #[serde(default)]
    pub avg_clustering: Option<f64>,
}

impl UndirectedConfig {
    /// Wraps shared parameters without a clustering target.
    pub fn new(lfr: LfrConfig) -> Self {
        Self {
            lfr,
            avg_clustering: None,
        }
    }

    /// Validates the shared parameters and the clustering target.
    pub fn validate(&self) -> Result<(), GraphGenError> {
        self.lfr.validate()?;
        if let Some(target) = self.avg_clustering {
            if !(0.0..=1.0).contains(&target) {
                return Err(config_error(
                    "clustering-range",
                    "avg_clustering must lie in [0, 1]",
                )
                .with_context("avg_clustering", target));
            }
        }
        Ok(())
    }
}

/// Directed LFR configuration; directed clustering is not defined so there is no target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectedConfig {
    /// Shared LFR parameters, applied independently to in- and out-degrees.
    #[serde(flatten)]
    pub lfr: LfrConfig,
}

impl DirectedConfig {
    /// Wraps shared parameters.
    pub fn new(lfr: LfrConfig) -> Self {
        Self { lfr }
    }

    /// Validates the shared parameters.
    pub fn validate(&self) -> Result<(), GraphGenError> {
        self.lfr.validate()
    }
}

/// Parameters of the weight assignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Target fraction of each node's strength carried by external edges.
    pub muw: f64,
    /// Minus exponent of the raw edge weight distribution.
    #[serde(default = "default_beta")]
    pub beta: f64,
}

fn default_beta() -> f64 {
    1.5
}

impl WeightConfig {
    /// Creates a weight configuration with the default exponent.
    pub fn new(muw: f64) -> Self {
        Self {
            muw,
            beta: default_beta(),
        }
    }

    /// Rejects weight parameters outside their domain.
    pub fn validate(&self) -> Result<(), GraphGenError> {
        if !(0.0..=1.0).contains(&self.muw) {
            return Err(config_error("weight-mixing-range", "muw must lie in [0, 1]")
                .with_context("muw", self.muw));
        }
        if !self.beta.is_finite() {
            return Err(config_error("weight-exponent", "beta must be finite")
                .with_context("beta", self.beta));
        }
        Ok(())
    }
}

fn config_error(code: &str, message: &str) -> GraphGenError {
    GraphGenError::Configuration(ErrorInfo::new(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> LfrConfig {
        LfrConfig::new(128, 8.0, 20, 0.1, 10, 30, 42)
    }

    #[test]
    fn example_configuration_is_valid() {
        base().validate().unwrap();
        assert_eq!(base().membership_slots(), 128);
    }

    #[test]
    fn average_above_max_is_rejected() {
        let mut config = base();
        config.average_k = 25.0;
        assert_eq!(config.validate().unwrap_err().info().code, "average-above-max");
    }

    #[test]
    fn max_degree_must_stay_below_node_count() {
        let mut config = base();
        config.max_degree = 128;
        assert_eq!(config.validate().unwrap_err().info().code, "max-degree-range");
    }

    #[test]
    fn overlap_slots_count_extra_memberships() {
        let mut config = base();
        config.overlapping_nodes = 10;
        config.overlap_membership = 3;
        config.validate().unwrap();
        assert_eq!(config.membership_slots(), 148);
        config.overlap_membership = 1;
        assert_eq!(config.validate().unwrap_err().info().code, "overlap-membership");
    }

    #[test]
    fn small_communities_cannot_host_hubs() {
        let mut config = base();
        config.com_size_max = 12;
        assert_eq!(
            config.validate().unwrap_err().info().code,
            "community-too-small"
        );
    }

    #[test]
    fn rounding_policy_uses_kebab_case() {
        let json = serde_json::to_string(&RoundingPolicy::RandomF).unwrap();
        assert_eq!(json, "\"random-f\"");
    }

    #[test]
    fn mut_alias_is_accepted() {
        let json = r#"{"num_nodes": 50, "average_k": 5, "max_degree": 10, "mut": 0.2,
                       "com_size_min": 10, "com_size_max": 20, "seed": 1}"#;
        let config: UndirectedConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.lfr.mu, 0.2);
        assert_eq!(config.lfr.tau, 2.0);
        assert!(config.avg_clustering.is_none());
    }
}
