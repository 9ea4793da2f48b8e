use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_lfr::WeightConfig;
use serde::{Deserialize, Serialize};

/// Parameters of the clique growth model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlemmConfig {
    /// Total number of nodes.
    pub num_nodes: usize,
    /// Size of the seed clique, of every founding clique and bound on the active set.
    pub clique_size: usize,
    /// Probability that a new tie is preferential rather than aimed at the active set.
    pub clique_linkage: f64,
    /// Seed of the single RNG stream.
    pub seed: u64,
    /// External strength fraction; `None` leaves the graph unweighted.
    #[serde(default)]
    pub muw: Option<f64>,
    /// Minus exponent of the raw weight distribution.
    #[serde(default = "default_beta")]
    pub beta: f64,
}

fn default_beta() -> f64 {
    1.5
}

impl KlemmConfig {
    /// Creates an unweighted configuration.
    pub fn new(num_nodes: usize, clique_size: usize, clique_linkage: f64, seed: u64) -> Self {
        Self {
            num_nodes,
            clique_size,
            clique_linkage,
            seed,
            muw: None,
            beta: default_beta(),
        }
    }

    /// Weight parameters, when weights were requested.
    pub fn weights(&self) -> Option<WeightConfig> {
        self.muw.map(|muw| WeightConfig {
            muw,
            beta: self.beta,
        })
    }

    /// Rejects parameters the growth process cannot honour.
    pub fn validate(&self) -> Result<(), GraphGenError> {
        if self.clique_size < 2 {
            return Err(GraphGenError::Configuration(
                ErrorInfo::new("clique-size", "clique_size must be at least 2")
                    .with_context("clique_size", self.clique_size),
            ));
        }
        if self.num_nodes < self.clique_size {
            return Err(GraphGenError::Configuration(
                ErrorInfo::new(
                    "num-nodes-below-clique",
                    "num_nodes must be at least clique_size",
                )
                .with_context("num_nodes", self.num_nodes)
                .with_context("clique_size", self.clique_size),
            ));
        }
        if !(0.0..=1.0).contains(&self.clique_linkage) {
            return Err(GraphGenError::Configuration(
                ErrorInfo::new("clique-linkage-range", "clique_linkage must lie in [0, 1]")
                    .with_context("clique_linkage", self.clique_linkage),
            ));
        }
        if let Some(weights) = self.weights() {
            weights.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_optional() {
        let json = r#"{"num_nodes": 30, "clique_size": 4, "clique_linkage": 0.5, "seed": 2}"#;
        let config: KlemmConfig = serde_json::from_str(json).unwrap();
        assert!(config.weights().is_none());
        config.validate().unwrap();

        let json = r#"{"num_nodes": 30, "clique_size": 4, "clique_linkage": 0.5, "seed": 2,
                       "muw": 0.2}"#;
        let config: KlemmConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.weights(), Some(WeightConfig::new(0.2)));
    }

    #[test]
    fn tiny_cliques_are_rejected() {
        let config = KlemmConfig::new(10, 1, 0.5, 0);
        assert_eq!(config.validate().unwrap_err().info().code, "clique-size");
        let config = KlemmConfig::new(3, 5, 0.5, 0);
        assert_eq!(config.validate().unwrap_err().info().code, "num-nodes-below-clique");
    }
}
