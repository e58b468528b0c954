//! Native clique embedding (CLQ).
//!
//! Logical node `(b, k)` is a chain of physical sites: horizontal qubit `k`
//! along row `b` from column 0 to `b`, then vertical qubit `k` down column
//! `b` from row `b` to the last row. The two halves meet in cell `(b, b)`.
//! Any two chains `(b, k)` and `(b', k')` with `b < b'` cross in cell
//! `(b', b)`, where the vertical qubit of the first couples to the
//! horizontal qubit of the second.

use std::collections::BTreeMap;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{Assignment, GenerationReport, Generator, GeneratorKind};
use crate::{
    BqpError, Result,
    topology::{ChimeraCoordinate, Coupler, SHORE_SIZE, Shore, SiteId, Topology},
};

/// Size of the embedded clique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqueReport {
    /// Logical nodes that survived pruning.
    pub logical_nodes: usize,
    /// Physical sites per chain.
    pub chain_length: usize,
}

/// Embeds the largest clique whose chains and crossing couplers are all
/// present. Consumes no randomness.
///
/// # Examples
/// ```
/// use bqpgen_core::{ClqGenerator, GenerationReport, Generator, Topology};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let topology = Topology::synthesize_full_yield(2)?;
/// let assignment = ClqGenerator.generate(&topology, &mut StdRng::seed_from_u64(0))?;
/// match assignment.report() {
///     GenerationReport::Clique(report) => assert_eq!(report.logical_nodes, 8),
///     other => panic!("unexpected report {other:?}"),
/// }
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ClqGenerator;

#[derive(Debug)]
struct Chain {
    block: usize,
    index: usize,
    couplers: Vec<Coupler>,
}

fn chain_sites(degree: usize, block: usize, index: usize) -> Vec<ChimeraCoordinate> {
    let horizontal =
        (0..=block).map(|col| ChimeraCoordinate::new(block, col, Shore::Horizontal, index));
    let vertical =
        (block..degree).map(|row| ChimeraCoordinate::new(row, block, Shore::Vertical, index));
    horizontal.chain(vertical).collect()
}

fn build_chain(topology: &Topology, block: usize, index: usize) -> Option<Chain> {
    let coordinates = chain_sites(topology.degree(), block, index);
    let sites = coordinates
        .iter()
        .map(|coordinate| topology.site_at(*coordinate))
        .collect::<Option<Vec<SiteId>>>()?;
    // Consecutive sites are linked: H-H along the row, the junction in cell
    // (block, block), then V-V down the column.
    let couplers = sites
        .windows(2)
        .map(|pair| match pair {
            [a, b] => topology.coupler_between(*a, *b),
            _ => None,
        })
        .collect::<Option<Vec<Coupler>>>()?;
    Some(Chain {
        block,
        index,
        couplers,
    })
}

/// Couplers realizing the logical edge between two chains.
fn crossing_couplers(topology: &Topology, first: &Chain, second: &Chain) -> Vec<Coupler> {
    let (upper, lower) = if first.block <= second.block {
        (first, second)
    } else {
        (second, first)
    };
    let cell = (lower.block, upper.block);
    let at = |shore, index| {
        topology.site_at(ChimeraCoordinate::new(cell.0, cell.1, shore, index))
    };
    let mut pairs = vec![(
        at(Shore::Vertical, upper.index),
        at(Shore::Horizontal, lower.index),
    )];
    if upper.block == lower.block {
        pairs.push((
            at(Shore::Vertical, lower.index),
            at(Shore::Horizontal, upper.index),
        ));
    }
    pairs
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => topology.coupler_between(a, b),
            _ => None,
        })
        .collect()
}

/// Repeatedly drops the chain missing the most logical edges until every
/// remaining pair is connected. Ties drop the higher logical index.
fn prune(chains: &mut Vec<Chain>, edges: &BTreeMap<(usize, usize), Vec<Coupler>>) {
    loop {
        let mut missing = vec![0_usize; chains.len()];
        for i in 0..chains.len() {
            for j in (i + 1)..chains.len() {
                if !edges.contains_key(&(logical_id(&chains[i]), logical_id(&chains[j]))) {
                    missing[i] += 1;
                    missing[j] += 1;
                }
            }
        }
        let worst = missing
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .max_by_key(|(position, count)| (**count, *position));
        match worst {
            Some((position, count)) => {
                let dropped = chains.remove(position);
                debug!(
                    block = dropped.block,
                    index = dropped.index,
                    missing = count,
                    "dropped chain with missing crossings"
                );
            }
            None => return,
        }
    }
}

const fn logical_id(chain: &Chain) -> usize {
    chain.block * SHORE_SIZE + chain.index
}

impl Generator for ClqGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Clq
    }

    #[instrument(name = "core.generate_clq", err, skip_all, fields(degree = topology.degree()))]
    fn generate(&self, topology: &Topology, _rng: &mut dyn RngCore) -> Result<Assignment> {
        let degree = topology.degree();
        let mut chains: Vec<Chain> = (0..degree)
            .flat_map(|block| (0..SHORE_SIZE).map(move |index| (block, index)))
            .filter_map(|(block, index)| build_chain(topology, block, index))
            .collect();

        let mut edges = BTreeMap::new();
        for (i, first) in chains.iter().enumerate() {
            for second in chains.iter().skip(i + 1) {
                let crossing = crossing_couplers(topology, first, second);
                if !crossing.is_empty() {
                    edges.insert((logical_id(first), logical_id(second)), crossing);
                }
            }
        }
        prune(&mut chains, &edges);

        if chains.len() < 2 {
            return Err(BqpError::TopologyTooSmall {
                generator: "clq",
                required_degree: 1,
                actual_degree: degree,
            });
        }

        let ferro = topology.coupler_range().low();
        let antiferro = topology.coupler_range().high();
        let mut couplings = BTreeMap::new();
        for chain in &chains {
            couplings.extend(chain.couplers.iter().map(|coupler| (*coupler, ferro)));
        }
        for (i, first) in chains.iter().enumerate() {
            for second in chains.iter().skip(i + 1) {
                if let Some(crossing) = edges.get(&(logical_id(first), logical_id(second))) {
                    couplings.extend(crossing.iter().map(|coupler| (*coupler, antiferro)));
                }
            }
        }

        let report = CliqueReport {
            logical_nodes: chains.len(),
            chain_length: degree + 1,
        };
        info!(
            logical_nodes = report.logical_nodes,
            chain_length = report.chain_length,
            "embedded clique"
        );
        Ok(Assignment::new(BTreeMap::new(), couplings)
            .with_report(GenerationReport::Clique(report)))
    }
}
