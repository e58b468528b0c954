//! Seeded damaged lattices standing in for real processor snapshots.
//!
//! Production chips lose a few percent of their qubits. [`damaged_lattice`]
//! removes a seeded random subset of sites from a full-yield lattice so the
//! benchmarks exercise the chain-pruning and dead-end paths.

use bqpgen_core::{SiteId, Topology};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::error::BenchSetupError;

const PER_MILLE: u32 = 1_000;

/// Errors raised for an unusable damaged-lattice configuration.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum HardwareConfigError {
    /// More than every qubit was asked to break.
    #[error("broken fraction {0}‰ exceeds 1000‰")]
    FractionTooLarge(u32),
}

/// Shape of a synthetic damaged lattice.
#[derive(Clone, Copy, Debug)]
pub struct HardwareConfig {
    /// Unit cells per side.
    pub degree: usize,
    /// Probability, in thousandths, that a qubit is broken.
    pub broken_per_mille: u32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Builds a lattice with a seeded fraction of its qubits removed.
///
/// Couplers touching a removed qubit are dropped with it. Ranges keep their
/// full-yield defaults.
///
/// # Errors
/// Returns [`BenchSetupError::Hardware`] when the fraction exceeds one and
/// [`BenchSetupError::Core`] when the degree is zero.
///
/// # Examples
/// ```
/// use bqpgen_benches::hardware::{HardwareConfig, damaged_lattice};
///
/// let config = HardwareConfig { degree: 4, broken_per_mille: 0, seed: 1 };
/// let topology = damaged_lattice(&config).expect("valid config");
/// assert_eq!(topology.sites().len(), 128);
/// ```
pub fn damaged_lattice(config: &HardwareConfig) -> Result<Topology, BenchSetupError> {
    if config.broken_per_mille > PER_MILLE {
        return Err(HardwareConfigError::FractionTooLarge(config.broken_per_mille).into());
    }
    let lattice = Topology::synthesize_full_yield(config.degree)?;
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let sites: Vec<SiteId> = lattice
        .sites()
        .iter()
        .copied()
        .filter(|_| !rng.gen_ratio(config.broken_per_mille, PER_MILLE))
        .collect();
    let mut survivors = sites.clone();
    survivors.sort_unstable();
    let couplers: Vec<(SiteId, SiteId)> = lattice
        .couplers()
        .iter()
        .filter(|coupler| {
            survivors.binary_search(&coupler.low()).is_ok()
                && survivors.binary_search(&coupler.high()).is_ok()
        })
        .map(|coupler| (coupler.low(), coupler.high()))
        .collect();
    let site_range = lattice.site_range();
    let coupler_range = lattice.coupler_range();
    Ok(Topology::from_hardware(
        sites,
        couplers,
        config.degree,
        (site_range.low(), site_range.high()),
        (coupler_range.low(), coupler_range.high()),
    )?)
}
