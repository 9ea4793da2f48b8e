use graphgen_core::errors::{ErrorInfo, GraphGenError};
use graphgen_core::rng::RngHandle;
use graphgen_core::topology::UndirectedTopology;
use graphgen_core::{GeneratedGraph, GenerationReport};
use graphgen_lfr::{assign_weights, mixing_fraction};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::config::KlemmConfig;

/// Generated graph together with growth diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct KlemmOutcome {
    /// Graph whose memberships are the founding cliques.
    pub graph: GeneratedGraph,
    /// Member ids of every founding clique, seed clique first.
    pub cliques: Vec<Vec<usize>>,
    /// Largest active set observed after any growth step.
    pub peak_active: usize,
}

/// Grows a clique graph.
///
/// A fully connected seed clique starts active. Later nodes arrive in
/// founding cliques of `clique_size` consecutive ids, each fully connected.
/// Every arriving node makes one tie outside its clique: preferential with
/// probability `clique_linkage`, otherwise to a uniformly chosen active node.
/// It then joins the active set and one other active node is retired with
/// probability proportional to `1 / degree`.
#[instrument(
    skip_all,
    fields(num_nodes = config.num_nodes, clique_size = config.clique_size, seed = config.seed)
)]
pub fn klemm_graph(config: &KlemmConfig) -> Result<KlemmOutcome, GraphGenError> {
    config.validate()?;
    let mut rng = RngHandle::from_seed(config.seed);
    let mut topology = UndirectedTopology::new(config.num_nodes);
    let mut memberships: Vec<Vec<usize>> = vec![Vec::new(); config.num_nodes];
    let mut cliques: Vec<Vec<usize>> = Vec::new();

    let seed_clique: Vec<usize> = (0..config.clique_size).collect();
    connect_clique(&mut topology, &seed_clique);
    for &node in &seed_clique {
        memberships[node].push(0);
    }
    let mut active = seed_clique.clone();
    let mut peak_active = active.len();
    cliques.push(seed_clique);

    let mut start = config.clique_size;
    while start < config.num_nodes {
        let end = (start + config.clique_size).min(config.num_nodes);
        let clique: Vec<usize> = (start..end).collect();
        let label = cliques.len();
        connect_clique(&mut topology, &clique);
        for &node in &clique {
            memberships[node].push(label);
            let target = choose_tie(&topology, &active, start, config.clique_linkage, &mut rng)?;
            topology.add_edge(node, target);
            active.push(node);
            retire_one(&topology, &mut active, node, &mut rng)?;
            peak_active = peak_active.max(active.len());
        }
        debug!(clique = label, members = clique.len(), "founding clique grown");
        cliques.push(clique);
        start = end;
    }

    let edges = topology.edges();
    let weights = config
        .weights()
        .map(|weights| assign_weights(config.num_nodes, &edges, &memberships, &weights, &mut rng))
        .transpose()?;
    let realized_mixing = mixing_fraction(&edges, &memberships);
    info!(
        edges = edges.len(),
        cliques = cliques.len(),
        peak_active,
        realized_mixing,
        "clique graph generated"
    );
    let graph = GeneratedGraph {
        num_nodes: config.num_nodes,
        directed: false,
        edges,
        memberships,
        report: GenerationReport {
            generator: if weights.is_some() {
                "klemm-weighted".to_string()
            } else {
                "klemm".to_string()
            },
            seed: config.seed,
            realized_mixing,
            weight_fit_error: weights.as_ref().map(|outcome| outcome.fit_error),
            ..GenerationReport::default()
        },
        weights: weights.map(|outcome| outcome.weights),
    };
    Ok(KlemmOutcome {
        graph,
        cliques,
        peak_active,
    })
}

fn connect_clique(topology: &mut UndirectedTopology, members: &[usize]) {
    for (index, &u) in members.iter().enumerate() {
        for &v in &members[index + 1..] {
            topology.add_edge(u, v);
        }
    }
}

/// Picks the partner of a new node whose clique starts at `clique_start`.
fn choose_tie(
    topology: &UndirectedTopology,
    active: &[usize],
    clique_start: usize,
    linkage: f64,
    rng: &mut RngHandle,
) -> Result<usize, GraphGenError> {
    let outside: Vec<usize> = active
        .iter()
        .copied()
        .filter(|&node| node < clique_start)
        .collect();
    if outside.is_empty() || rng.gen::<f64>() < linkage {
        let degrees: Vec<usize> = (0..clique_start).map(|node| topology.degree(node)).collect();
        let index = WeightedIndex::new(&degrees).map_err(|err| {
            GraphGenError::Convergence(
                ErrorInfo::new("preferential-tie", err.to_string())
                    .with_context("candidates", clique_start),
            )
        })?;
        return Ok(index.sample(rng));
    }
    Ok(outside[rng.gen_range(0..outside.len())])
}

/// Removes one active node other than `newcomer`, weighted by `1 / degree`.
fn retire_one(
    topology: &UndirectedTopology,
    active: &mut Vec<usize>,
    newcomer: usize,
    rng: &mut RngHandle,
) -> Result<(), GraphGenError> {
    let candidates: Vec<usize> = (0..active.len())
        .filter(|&slot| active[slot] != newcomer)
        .collect();
    let inverse: Vec<f64> = candidates
        .iter()
        .map(|&slot| 1.0 / topology.degree(active[slot]).max(1) as f64)
        .collect();
    let index = WeightedIndex::new(&inverse).map_err(|err| {
        GraphGenError::Convergence(
            ErrorInfo::new("deactivation", err.to_string())
                .with_context("active", active.len()),
        )
    })?;
    active.remove(candidates[index.sample(rng)]);
    Ok(())
}
