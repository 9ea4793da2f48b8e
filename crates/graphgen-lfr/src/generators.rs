use graphgen_core::errors::GraphGenError;
use graphgen_core::powerlaw::PowerLaw;
use graphgen_core::rng::RngHandle;
use graphgen_core::{shares_community, ClusteringSummary, Edge, GeneratedGraph, GenerationReport};
use tracing::{info, instrument};

use crate::assignment::{assign_communities, choose_overlapping, slot_demands, Assignment};
use crate::budget::{ideal_internal, split_internal, StubBudget};
use crate::clustering::rewire_for_clustering;
use crate::communities::{sample_community_sizes, size_range};
use crate::config::{DirectedConfig, LfrConfig, UndirectedConfig, WeightConfig};
use crate::degrees::{sample_degree_sequence, sample_directed_sequences};
use crate::directed::{wire_directed, DirectedBudget, IdealShares};
use crate::weights::assign_weights;
use crate::wiring::wire_undirected;

/// Generates an unweighted undirected LFR graph.
pub fn unweighted_undirected(config: &UndirectedConfig) -> Result<GeneratedGraph, GraphGenError> {
    generate_undirected(config, None)
}

/// Generates a weighted undirected LFR graph.
pub fn weighted_undirected(
    config: &UndirectedConfig,
    weights: &WeightConfig,
) -> Result<GeneratedGraph, GraphGenError> {
    generate_undirected(config, Some(weights))
}

/// Generates an unweighted directed LFR graph.
pub fn unweighted_directed(config: &DirectedConfig) -> Result<GeneratedGraph, GraphGenError> {
    generate_directed(config, None)
}

/// Generates a weighted directed LFR graph.
pub fn weighted_directed(
    config: &DirectedConfig,
    weights: &WeightConfig,
) -> Result<GeneratedGraph, GraphGenError> {
    generate_directed(config, Some(weights))
}

/// Fraction of edges whose endpoints share no community.
pub fn mixing_fraction(edges: &[Edge], memberships: &[Vec<usize>]) -> f64 {
    if edges.is_empty() {
        return 0.0;
    }
    let external = edges
        .iter()
        .filter(|&&[u, v]| !shares_community(&memberships[u], &memberships[v]))
        .count();
    external as f64 / edges.len() as f64
}

#[instrument(
    skip_all,
    fields(num_nodes = config.lfr.num_nodes, seed = config.lfr.seed, weighted = weights.is_some())
)]
fn generate_undirected(
    config: &UndirectedConfig,
    weights: Option<&WeightConfig>,
) -> Result<GeneratedGraph, GraphGenError> {
    config.validate()?;
    if let Some(weights) = weights {
        weights.validate()?;
    }
    let lfr = &config.lfr;
    let mut rng = RngHandle::from_seed(lfr.seed);

    let sequence = sample_degree_sequence(
        lfr.num_nodes,
        lfr.average_k,
        lfr.max_degree,
        lfr.tau,
        true,
        &mut rng,
    )?;
    let ideal: Vec<f64> = sequence
        .degrees
        .iter()
        .map(|&k| ideal_internal(k, lfr.mu))
        .collect();
    let internal: Vec<usize> = sequence
        .degrees
        .iter()
        .map(|&k| split_internal(k, lfr.mu, lfr.rounding, &mut rng))
        .collect();
    let overlapping = choose_overlapping(lfr.num_nodes, lfr.overlapping_nodes, &mut rng);
    let demands = slot_demands(&internal, &overlapping, lfr.memberships_per_overlap());
    let assignment = place_communities(lfr, &sequence.distribution, demands, &mut rng)?;

    let mut budget = StubBudget::new(&sequence.degrees, &assignment);
    budget.repair_parity(&assignment, &ideal, lfr.rounding, &mut rng);
    let (mut topology, stats) = wire_undirected(&budget, &assignment, lfr.rounding, &mut rng)?;
    let clustering = config.avg_clustering.map(|target| {
        rewire_for_clustering(&mut topology, &assignment.memberships, target, &mut rng)
    });

    let draft = Draft {
        generator: if weights.is_some() {
            "lfr-undirected-weighted"
        } else {
            "lfr-undirected"
        },
        seed: lfr.seed,
        directed: false,
        edges: topology.edges(),
        memberships: assignment.memberships,
        stubs_added: budget.added + stats.added,
        stubs_dropped: budget.dropped + stats.dropped,
        stubs_rerouted: stats.rerouted,
        clustering,
    };
    draft.finish(weights, &mut rng)
}

#[instrument(
    skip_all,
    fields(num_nodes = config.lfr.num_nodes, seed = config.lfr.seed, weighted = weights.is_some())
)]
fn generate_directed(
    config: &DirectedConfig,
    weights: Option<&WeightConfig>,
) -> Result<GeneratedGraph, GraphGenError> {
    config.validate()?;
    if let Some(weights) = weights {
        weights.validate()?;
    }
    let lfr = &config.lfr;
    let mut rng = RngHandle::from_seed(lfr.seed);

    let (ins, outs) = sample_directed_sequences(
        lfr.num_nodes,
        lfr.average_k,
        lfr.max_degree,
        lfr.tau,
        &mut rng,
    )?;
    let ideal_in: Vec<f64> = ins.degrees.iter().map(|&k| ideal_internal(k, lfr.mu)).collect();
    let ideal_out: Vec<f64> = outs.degrees.iter().map(|&k| ideal_internal(k, lfr.mu)).collect();
    let internal_in: Vec<usize> = ins
        .degrees
        .iter()
        .map(|&k| split_internal(k, lfr.mu, lfr.rounding, &mut rng))
        .collect();
    let internal_out: Vec<usize> = outs
        .degrees
        .iter()
        .map(|&k| split_internal(k, lfr.mu, lfr.rounding, &mut rng))
        .collect();
    let overlapping = choose_overlapping(lfr.num_nodes, lfr.overlapping_nodes, &mut rng);
    let membership = lfr.memberships_per_overlap();
    let in_slots = slot_demands(&internal_in, &overlapping, membership);
    let out_slots = slot_demands(&internal_out, &overlapping, membership);
    let demands: Vec<Vec<usize>> = in_slots
        .iter()
        .zip(&out_slots)
        .map(|(ins, outs)| ins.iter().zip(outs).map(|(&a, &b)| a.max(b)).collect())
        .collect();
    let assignment = place_communities(lfr, &ins.distribution, demands, &mut rng)?;

    let mut budget = DirectedBudget::new(&outs.degrees, &ins.degrees, out_slots, in_slots);
    budget.balance(
        &assignment,
        IdealShares {
            outgoing: &ideal_out,
            incoming: &ideal_in,
        },
        lfr.rounding,
        &mut rng,
    )?;
    let (topology, stats) = wire_directed(&budget, &assignment, lfr.rounding, &mut rng)?;

    let draft = Draft {
        generator: if weights.is_some() {
            "lfr-directed-weighted"
        } else {
            "lfr-directed"
        },
        seed: lfr.seed,
        directed: true,
        edges: topology.arcs(),
        memberships: assignment.memberships,
        stubs_added: budget.added + stats.added,
        stubs_dropped: budget.dropped + stats.dropped,
        stubs_rerouted: stats.rerouted,
        clustering: None,
    };
    draft.finish(weights, &mut rng)
}

fn place_communities(
    lfr: &LfrConfig,
    degree_law: &PowerLaw,
    demands: Vec<Vec<usize>>,
    rng: &mut RngHandle,
) -> Result<Assignment, GraphGenError> {
    let range = size_range(lfr, degree_law)?;
    let flat: Vec<usize> = demands.iter().flatten().copied().collect();
    let sizes = sample_community_sizes(
        range,
        lfr.tau2,
        lfr.membership_slots(),
        lfr.memberships_per_overlap(),
        &flat,
        rng,
    )?;
    assign_communities(&demands, &sizes, rng)
}

struct Draft {
    generator: &'static str,
    seed: u64,
    directed: bool,
    edges: Vec<Edge>,
    memberships: Vec<Vec<usize>>,
    stubs_added: usize,
    stubs_dropped: usize,
    stubs_rerouted: usize,
    clustering: Option<ClusteringSummary>,
}

impl Draft {
    fn finish(
        self,
        weights: Option<&WeightConfig>,
        rng: &mut RngHandle,
    ) -> Result<GeneratedGraph, GraphGenError> {
        let num_nodes = self.memberships.len();
        let fitted = weights
            .map(|config| assign_weights(num_nodes, &self.edges, &self.memberships, config, rng))
            .transpose()?;
        let realized_mixing = mixing_fraction(&self.edges, &self.memberships);
        info!(
            generator = self.generator,
            edges = self.edges.len(),
            realized_mixing,
            stubs_added = self.stubs_added,
            stubs_dropped = self.stubs_dropped,
            stubs_rerouted = self.stubs_rerouted,
            "graph generated"
        );
        Ok(GeneratedGraph {
            num_nodes,
            directed: self.directed,
            edges: self.edges,
            memberships: self.memberships,
            report: GenerationReport {
                generator: self.generator.to_string(),
                seed: self.seed,
                realized_mixing,
                stubs_dropped: self.stubs_dropped,
                stubs_added: self.stubs_added,
                stubs_rerouted: self.stubs_rerouted,
                clustering: self.clustering,
                weight_fit_error: fitted.as_ref().map(|outcome| outcome.fit_error),
            },
            weights: fitted.map(|outcome| outcome.weights),
        })
    }
}
