//! Site identifiers, canonical couplers and chimera coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BqpError, Result};

/// Number of qubits on one shore of a unit cell.
pub const SHORE_SIZE: usize = 4;

/// Number of qubits in one unit cell.
pub const CELL_SIZE: usize = 2 * SHORE_SIZE;

/// Identifier of one hardware qubit position.
///
/// # Examples
/// ```
/// use bqpgen_core::SiteId;
///
/// let site = SiteId::new(12);
/// assert_eq!(site.get(), 12);
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SiteId(u32);

impl SiteId {
    /// Creates a site identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u32) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for SiteId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// An unordered pair of distinct sites stored with the smaller id first.
///
/// Serializes as a two-element array `[low, high]`.
///
/// # Examples
/// ```
/// use bqpgen_core::{Coupler, SiteId};
///
/// let coupler = Coupler::new(SiteId::new(9), SiteId::new(3)).expect("distinct sites");
/// assert_eq!(coupler.low(), SiteId::new(3));
/// assert_eq!(coupler.high(), SiteId::new(9));
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "(SiteId, SiteId)", try_from = "(SiteId, SiteId)")]
pub struct Coupler {
    low: SiteId,
    high: SiteId,
}

impl Coupler {
    /// Canonicalizes the pair so the smaller id comes first.
    ///
    /// # Errors
    /// Returns [`BqpError::SelfLoop`] when both endpoints are the same site.
    pub fn new(a: SiteId, b: SiteId) -> Result<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Ok(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => Err(BqpError::SelfLoop { site: a }),
        }
    }

    /// Builds a coupler from endpoints already known to differ.
    pub(crate) fn between(a: SiteId, b: SiteId) -> Self {
        if a < b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Smaller endpoint.
    #[must_use]
    pub const fn low(&self) -> SiteId {
        self.low
    }

    /// Larger endpoint.
    #[must_use]
    pub const fn high(&self) -> SiteId {
        self.high
    }

    /// Returns whether `site` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, site: SiteId) -> bool {
        self.low == site || self.high == site
    }
}

impl fmt::Display for Coupler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

impl From<Coupler> for (SiteId, SiteId) {
    fn from(value: Coupler) -> Self {
        (value.low, value.high)
    }
}

impl TryFrom<(SiteId, SiteId)> for Coupler {
    type Error = BqpError;

    fn try_from((a, b): (SiteId, SiteId)) -> Result<Self> {
        Self::new(a, b)
    }
}

/// Which half of a unit cell a qubit sits on.
///
/// Vertical qubits couple to the same index in the cells above and below;
/// horizontal qubits couple to the same index in the cells left and right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shore {
    /// Shore `0`, linked along columns.
    Vertical,
    /// Shore `1`, linked along rows.
    Horizontal,
}

impl Shore {
    const fn offset(self) -> usize {
        match self {
            Self::Vertical => 0,
            Self::Horizontal => SHORE_SIZE,
        }
    }
}

/// Position of a qubit inside a chimera lattice.
///
/// Sites are numbered `8 * (row * degree + col) + 4 * shore + index`, where
/// `degree` is the lattice degree the numbering was issued for.
///
/// # Examples
/// ```
/// use bqpgen_core::{ChimeraCoordinate, Shore, SiteId};
///
/// let coordinate = ChimeraCoordinate::new(1, 0, Shore::Horizontal, 2);
/// let site = coordinate.to_site(2).expect("inside the lattice");
/// assert_eq!(site, SiteId::new(22));
/// assert_eq!(ChimeraCoordinate::from_site(site, 2), Some(coordinate));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChimeraCoordinate {
    /// Unit-cell row.
    pub row: usize,
    /// Unit-cell column.
    pub col: usize,
    /// Shore within the cell.
    pub shore: Shore,
    /// Qubit index within the shore, `0..4`.
    pub index: usize,
}

impl ChimeraCoordinate {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize, shore: Shore, index: usize) -> Self {
        Self {
            row,
            col,
            shore,
            index,
        }
    }

    /// Decodes `site` for a lattice of the given degree.
    ///
    /// Returns `None` when the id lies beyond the last cell.
    #[must_use]
    pub fn from_site(site: SiteId, degree: usize) -> Option<Self> {
        let id = usize::try_from(site.get()).ok()?;
        let cell = id / CELL_SIZE;
        if degree == 0 || cell >= degree.checked_mul(degree)? {
            return None;
        }
        let within = id % CELL_SIZE;
        let shore = if within < SHORE_SIZE {
            Shore::Vertical
        } else {
            Shore::Horizontal
        };
        Some(Self {
            row: cell / degree,
            col: cell % degree,
            shore,
            index: within % SHORE_SIZE,
        })
    }

    /// Encodes the coordinate for a lattice of the given degree.
    ///
    /// Returns `None` when the coordinate does not fit the lattice.
    #[must_use]
    pub fn to_site(self, degree: usize) -> Option<SiteId> {
        if self.row >= degree || self.col >= degree || self.index >= SHORE_SIZE {
            return None;
        }
        let cell = self.row.checked_mul(degree)?.checked_add(self.col)?;
        let id = cell
            .checked_mul(CELL_SIZE)?
            .checked_add(self.shore.offset() + self.index)?;
        u32::try_from(id).ok().map(SiteId::new)
    }

    /// Returns the unit cell `(row, col)` holding this qubit.
    #[must_use]
    pub const fn cell(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}
