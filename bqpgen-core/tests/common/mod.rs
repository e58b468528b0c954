use std::collections::BTreeSet;

use bqpgen_core::{Assignment, GeneratorConfig, SiteId, Topology};
use rand::{SeedableRng, rngs::StdRng};

/// Defect-free lattice of `degree`.
#[must_use]
pub fn full(degree: usize) -> Topology {
    Topology::synthesize_full_yield(degree).expect("full-yield lattice must build")
}

/// Full-yield lattice with `broken` sites and their couplers removed.
#[must_use]
pub fn damaged(degree: usize, broken: &BTreeSet<u32>) -> Topology {
    let lattice = full(degree);
    let sites = lattice
        .sites()
        .iter()
        .copied()
        .filter(|site| !broken.contains(&site.get()));
    let couplers: Vec<(SiteId, SiteId)> = lattice
        .couplers()
        .iter()
        .filter(|c| !broken.contains(&c.low().get()) && !broken.contains(&c.high().get()))
        .map(|c| (c.low(), c.high()))
        .collect();
    Topology::from_hardware(sites, couplers, degree, (-2.0, 2.0), (-1.0, 1.0))
        .expect("damaged lattice must wrap")
}

pub fn run(config: GeneratorConfig, topology: &Topology, seed: u64) -> bqpgen_core::Result<Assignment> {
    config.generate(topology, &mut StdRng::seed_from_u64(seed))
}

/// Couplings as raw `(low, high, weight)` triples.
#[must_use]
pub fn raw_couplings(assignment: &Assignment) -> Vec<(u32, u32, f64)> {
    assignment
        .couplings()
        .iter()
        .map(|(c, w)| (c.low().get(), c.high().get(), *w))
        .collect()
}
