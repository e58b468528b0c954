//! Immutable model of a chimera processor's active sites and couplers.
//!
//! A [`Topology`] is built once, either from a hardware description or by
//! synthesizing a defect-free lattice, and never mutated afterwards. Degree
//! filtering derives a new value. Sites, couplers and adjacency lists are kept
//! sorted so every consumer iterates them in the same order.

mod lattice;
mod site;

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use tracing::{debug, instrument};

use crate::{BqpError, Result, range::ValueRange};

pub use self::site::{CELL_SIZE, ChimeraCoordinate, Coupler, SHORE_SIZE, Shore, SiteId};

#[derive(Debug, PartialEq)]
struct TopologyInner {
    sites: Vec<SiteId>,
    couplers: Vec<Coupler>,
    site_index: HashMap<SiteId, usize>,
    coupler_index: HashMap<Coupler, usize>,
    adjacency: Vec<Vec<SiteId>>,
    hardware_degree: usize,
    degree: usize,
    site_range: ValueRange,
    coupler_range: ValueRange,
}

/// Active sites and couplers of a chimera processor plus their legal value
/// ranges.
///
/// Cloning is cheap: the arena is shared behind an [`Arc`].
///
/// # Examples
/// ```
/// use bqpgen_core::Topology;
///
/// let topology = Topology::synthesize_full_yield(2)?;
/// assert_eq!(topology.sites().len(), 32);
/// assert_eq!(topology.couplers().len(), 80);
///
/// let single_cell = topology.filter_to_degree(1)?;
/// assert_eq!(single_cell.sites().len(), 8);
/// assert_eq!(single_cell.degree(), 1);
/// # Ok::<(), bqpgen_core::BqpError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Topology {
    inner: Arc<TopologyInner>,
}

impl Topology {
    /// Builds every site and coupler of a defect-free lattice with the default
    /// ranges (`[-2, 2]` for sites, `[-1, 1]` for couplers).
    ///
    /// # Errors
    /// Returns [`BqpError::InvalidParameter`] when `degree` is zero.
    #[instrument(name = "core.synthesize_full_yield", err)]
    pub fn synthesize_full_yield(degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(BqpError::invalid_parameter(
                "degree",
                "a chimera lattice needs at least one unit cell",
            ));
        }
        Self::assemble(
            lattice::chimera_sites(degree),
            lattice::chimera_arcs(degree),
            degree,
            degree,
            ValueRange::DEFAULT_SITE,
            ValueRange::DEFAULT_COUPLER,
        )
    }

    /// Wraps an externally supplied topology.
    ///
    /// Couplers are canonicalized so the smaller id comes first. Repeated
    /// sites collapse silently.
    ///
    /// # Errors
    /// Returns a configuration error when `degree` is zero, a range is
    /// degenerate, a coupler is a self loop or listed twice, a coupler
    /// endpoint is not an active site, or a site does not decode inside a
    /// lattice of `degree`.
    pub fn from_hardware(
        sites: impl IntoIterator<Item = SiteId>,
        couplers: impl IntoIterator<Item = (SiteId, SiteId)>,
        degree: usize,
        site_range: (f64, f64),
        coupler_range: (f64, f64),
    ) -> Result<Self> {
        if degree == 0 {
            return Err(BqpError::invalid_parameter(
                "degree",
                "hardware degree must be at least 1",
            ));
        }
        let site_range = ValueRange::named("site_range", site_range.0, site_range.1)?;
        let coupler_range = ValueRange::named("coupler_range", coupler_range.0, coupler_range.1)?;
        let topology = Self::assemble(
            sites.into_iter().collect(),
            couplers.into_iter().collect(),
            degree,
            degree,
            site_range,
            coupler_range,
        )?;
        debug!(
            sites = topology.sites().len(),
            couplers = topology.couplers().len(),
            degree,
            "wrapped hardware topology"
        );
        Ok(topology)
    }

    /// Keeps only the sites in the top-left `degree x degree` block of unit
    /// cells and the couplers between them.
    ///
    /// Site ids are unchanged. Filtering to the current degree returns an
    /// equal topology.
    ///
    /// # Errors
    /// Returns [`BqpError::InvalidParameter`] for a zero degree and
    /// [`BqpError::DegreeExceeded`] when `degree` exceeds the current degree.
    #[instrument(name = "core.filter_to_degree", err, skip(self), fields(from = self.degree()))]
    pub fn filter_to_degree(&self, degree: usize) -> Result<Self> {
        if degree == 0 {
            return Err(BqpError::invalid_parameter(
                "degree",
                "cannot filter to an empty lattice",
            ));
        }
        if degree > self.degree() {
            return Err(BqpError::DegreeExceeded {
                requested: degree,
                available: self.degree(),
            });
        }
        if degree == self.degree() {
            return Ok(self.clone());
        }

        let inside = |site: &SiteId| {
            self.coordinate(*site)
                .is_some_and(|c| c.row < degree && c.col < degree)
        };
        let sites: Vec<SiteId> = self.sites().iter().copied().filter(inside).collect();
        let arcs: Vec<(SiteId, SiteId)> = self
            .couplers()
            .iter()
            .filter(|coupler| inside(&coupler.low()) && inside(&coupler.high()))
            .map(|coupler| (coupler.low(), coupler.high()))
            .collect();
        Self::assemble(
            sites,
            arcs,
            self.hardware_degree(),
            degree,
            *self.site_range(),
            *self.coupler_range(),
        )
    }

    fn assemble(
        mut sites: Vec<SiteId>,
        arcs: Vec<(SiteId, SiteId)>,
        hardware_degree: usize,
        degree: usize,
        site_range: ValueRange,
        coupler_range: ValueRange,
    ) -> Result<Self> {
        sites.sort_unstable();
        sites.dedup();
        if let Some(site) = sites
            .iter()
            .copied()
            .find(|site| ChimeraCoordinate::from_site(*site, hardware_degree).is_none())
        {
            return Err(BqpError::SiteOutsideLattice {
                site,
                degree: hardware_degree,
            });
        }
        let site_index: HashMap<SiteId, usize> = sites
            .iter()
            .enumerate()
            .map(|(index, site)| (*site, index))
            .collect();

        let mut unique = BTreeSet::new();
        for (a, b) in arcs {
            let coupler = Coupler::new(a, b)?;
            for endpoint in [coupler.low(), coupler.high()] {
                if !site_index.contains_key(&endpoint) {
                    return Err(BqpError::UnknownEndpoint {
                        coupler,
                        site: endpoint,
                    });
                }
            }
            if !unique.insert(coupler) {
                return Err(BqpError::DuplicateCoupler { coupler });
            }
        }
        let couplers: Vec<Coupler> = unique.into_iter().collect();
        let coupler_index = couplers
            .iter()
            .enumerate()
            .map(|(index, coupler)| (*coupler, index))
            .collect();

        let mut adjacency = vec![Vec::new(); sites.len()];
        for coupler in &couplers {
            for (from, to) in [
                (coupler.low(), coupler.high()),
                (coupler.high(), coupler.low()),
            ] {
                if let Some(list) = site_index
                    .get(&from)
                    .and_then(|index| adjacency.get_mut(*index))
                {
                    list.push(to);
                }
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }

        Ok(Self {
            inner: Arc::new(TopologyInner {
                sites,
                couplers,
                site_index,
                coupler_index,
                adjacency,
                hardware_degree,
                degree,
                site_range,
                coupler_range,
            }),
        })
    }

    /// Active sites in ascending order.
    #[must_use]
    pub fn sites(&self) -> &[SiteId] {
        &self.inner.sites
    }

    /// Active couplers in ascending canonical order.
    #[must_use]
    pub fn couplers(&self) -> &[Coupler] {
        &self.inner.couplers
    }

    /// Declared degree: the lattice is viewed as `degree x degree` unit cells.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.inner.degree
    }

    /// Degree the site numbering was issued for. Filtering never changes it.
    #[must_use]
    pub fn hardware_degree(&self) -> usize {
        self.inner.hardware_degree
    }

    /// Legal site-bias values.
    #[must_use]
    pub fn site_range(&self) -> &ValueRange {
        &self.inner.site_range
    }

    /// Legal coupler-weight values.
    #[must_use]
    pub fn coupler_range(&self) -> &ValueRange {
        &self.inner.coupler_range
    }

    /// Returns whether `site` is active.
    #[must_use]
    pub fn contains_site(&self, site: SiteId) -> bool {
        self.inner.site_index.contains_key(&site)
    }

    /// Returns whether `coupler` is present.
    #[must_use]
    pub fn contains_coupler(&self, coupler: &Coupler) -> bool {
        self.inner.coupler_index.contains_key(coupler)
    }

    /// Returns the coupler between two active sites, if present.
    #[must_use]
    pub fn coupler_between(&self, a: SiteId, b: SiteId) -> Option<Coupler> {
        let coupler = Coupler::new(a, b).ok()?;
        self.contains_coupler(&coupler).then_some(coupler)
    }

    /// Neighbours of `site` in ascending order; empty for inactive sites.
    #[must_use]
    pub fn neighbours(&self, site: SiteId) -> &[SiteId] {
        self.inner
            .site_index
            .get(&site)
            .and_then(|index| self.inner.adjacency.get(*index))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Decodes `site` against the hardware numbering.
    #[must_use]
    pub fn coordinate(&self, site: SiteId) -> Option<ChimeraCoordinate> {
        ChimeraCoordinate::from_site(site, self.hardware_degree())
    }

    /// Returns the active site at `coordinate`, if any. Coordinates outside
    /// the declared degree never resolve.
    #[must_use]
    pub fn site_at(&self, coordinate: ChimeraCoordinate) -> Option<SiteId> {
        if coordinate.row >= self.degree() || coordinate.col >= self.degree() {
            return None;
        }
        coordinate
            .to_site(self.hardware_degree())
            .filter(|site| self.contains_site(*site))
    }
}

/// Smallest square lattice degree able to number `site_count` sites.
///
/// # Examples
/// ```
/// use bqpgen_core::infer_degree;
///
/// assert_eq!(infer_degree(1152), 12);
/// assert_eq!(infer_degree(1100), 12);
/// assert_eq!(infer_degree(33), 3);
/// ```
#[must_use]
pub fn infer_degree(site_count: usize) -> usize {
    let mut degree = 0_usize;
    while degree
        .checked_mul(degree)
        .and_then(|cells| cells.checked_mul(CELL_SIZE))
        .is_some_and(|capacity| capacity < site_count)
    {
        degree += 1;
    }
    degree
}

#[cfg(test)]
mod tests;
