//! Random-walk cycle sampling over a [`Topology`].
//!
//! [`LoopSampler`] draws self-avoiding walks and reports whether each walk
//! closed back on its start. The [`budget`] submodule bounds how many walks a
//! caller may draw.

mod budget;

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::topology::{Coupler, SiteId, Topology};

pub use self::budget::{
    BudgetLimit, LoopReport, RejectCounting, SamplerState, SamplingBudget, SamplingSession,
};

/// A cycle of distinct sites. The edge from the last site back to the first
/// is implied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loop {
    sites: Vec<SiteId>,
}

impl Loop {
    pub(crate) const fn from_sites(sites: Vec<SiteId>) -> Self {
        Self { sites }
    }

    /// Sites in walk order, starting at the origin.
    #[must_use]
    pub fn sites(&self) -> &[SiteId] {
        &self.sites
    }

    /// Number of edges, including the closing edge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns whether the loop has no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Couplers traversed in walk order, ending with the closing edge.
    pub fn couplers(&self) -> impl Iterator<Item = Coupler> + '_ {
        self.sites
            .iter()
            .zip(self.sites.iter().cycle().skip(1))
            .map(|(a, b)| Coupler::between(*a, *b))
    }
}

/// Result of one random walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The walk chose its start site again.
    Closed(Loop),
    /// The walk ran out of unvisited neighbours after `length` edges.
    DeadEnd {
        /// Edges walked before stopping.
        length: usize,
    },
}

/// Draws self-avoiding random walks on a topology.
///
/// Every random choice indexes a sorted slice (the active sites, then each
/// site's sorted neighbours) so a seeded generator reproduces the same walks.
///
/// # Examples
/// ```
/// use bqpgen_core::{LoopSampler, Topology, WalkOutcome};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let topology = Topology::synthesize_full_yield(1)?;
/// let sampler = LoopSampler::new(&topology);
/// let mut rng = StdRng::seed_from_u64(7);
/// match sampler.sample_walk(&mut rng) {
///     WalkOutcome::Closed(cycle) => assert!(cycle.len() >= 4),
///     WalkOutcome::DeadEnd { length } => assert!(length <= 8),
/// }
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LoopSampler<'a> {
    topology: &'a Topology,
}

impl<'a> LoopSampler<'a> {
    /// Creates a sampler over `topology`.
    #[must_use]
    pub const fn new(topology: &'a Topology) -> Self {
        Self { topology }
    }

    /// Walks from a uniformly chosen site, stepping to a uniformly chosen
    /// unvisited neighbour until the start is chosen again or no step is
    /// possible.
    ///
    /// The start becomes a candidate only once the walk has two edges, so a
    /// closed loop always has at least three sites.
    pub fn sample_walk<R: Rng + ?Sized>(&self, rng: &mut R) -> WalkOutcome {
        let Some(&start) = self.topology.sites().choose(rng) else {
            return WalkOutcome::DeadEnd { length: 0 };
        };
        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        let mut current = start;
        loop {
            let may_close = path.len() >= 3;
            let candidates: Vec<SiteId> = self
                .topology
                .neighbours(current)
                .iter()
                .copied()
                .filter(|site| !visited.contains(site) || (may_close && *site == start))
                .collect();
            let Some(&next) = candidates.choose(rng) else {
                return WalkOutcome::DeadEnd {
                    length: path.len() - 1,
                };
            };
            if next == start {
                return WalkOutcome::Closed(Loop::from_sites(path));
            }
            visited.insert(next);
            path.push(next);
            current = next;
        }
    }
}

#[cfg(test)]
mod tests;
