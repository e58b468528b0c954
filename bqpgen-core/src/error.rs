//! Error types for the bqpgen core library.
//!
//! Defines the error enum exposed by the public API, the non-fatal
//! frustrated-loop shortfall warning, and a convenient result alias.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    sampler::BudgetLimit,
    topology::{Coupler, SiteId},
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Identifies the site or coupler that carried an offending value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueTarget {
    /// A site bias.
    Site(SiteId),
    /// A coupler weight.
    Coupler(Coupler),
}

impl fmt::Display for ValueTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site(site) => write!(f, "site {site}"),
            Self::Coupler(coupler) => write!(f, "coupler {coupler}"),
        }
    }
}

/// Broad classification of [`BqpError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Invalid or inconsistent parameters and topologies. Raised before any
    /// generation work starts.
    Configuration,
    /// The requested embedding or tiling does not fit the topology.
    TopologyTooSmall,
    /// A generated value fell outside its declared range.
    RangeViolation,
    /// A record referenced sites or couplers it does not declare.
    Validation,
}

/// Error type produced by topology construction, generation and export.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BqpError {
    /// A generator or topology parameter was rejected.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// A value range was empty, inverted or non-finite.
    #[error("{name} [{low}, {high}] is not a non-degenerate finite interval")]
    DegenerateRange {
        /// Which range was rejected.
        name: &'static str,
        /// Supplied lower bound.
        low: f64,
        /// Supplied upper bound.
        high: f64,
    },
    /// Degree filtering asked for a larger lattice than the topology holds.
    #[error("cannot filter a topology of degree {available} to degree {requested}")]
    DegreeExceeded {
        /// Requested degree.
        requested: usize,
        /// Degree of the topology being filtered.
        available: usize,
    },
    /// Weak-strong cluster networks tile the lattice in 3x3 blocks.
    #[error("chimera degree {degree} is not a multiple of 3")]
    DegreeNotMultipleOfThree {
        /// Degree of the offending topology.
        degree: usize,
    },
    /// A coupler joined a site to itself.
    #[error("coupler on site {site} is a self loop")]
    SelfLoop {
        /// The repeated endpoint.
        site: SiteId,
    },
    /// The same coupler was listed twice, possibly reversed.
    #[error("coupler {coupler} is listed more than once")]
    DuplicateCoupler {
        /// The repeated coupler in canonical form.
        coupler: Coupler,
    },
    /// A coupler endpoint is not an active site.
    #[error("coupler {coupler} references inactive site {site}")]
    UnknownEndpoint {
        /// Coupler carrying the missing endpoint.
        coupler: Coupler,
        /// The endpoint missing from the site set.
        site: SiteId,
    },
    /// A site identifier does not decode inside the lattice.
    #[error("site {site} lies outside a chimera lattice of degree {degree}")]
    SiteOutsideLattice {
        /// Offending site.
        site: SiteId,
        /// Degree used for decoding.
        degree: usize,
    },
    /// The topology cannot host the requested structure.
    #[error(
        "{generator} requires a chimera degree of at least {required_degree}, the topology has degree {actual_degree}"
    )]
    TopologyTooSmall {
        /// Generator that needed more room.
        generator: &'static str,
        /// Minimum degree that would have worked.
        required_degree: usize,
        /// Degree of the supplied topology.
        actual_degree: usize,
    },
    /// A value fell outside the declared range.
    #[error("{target} has value {value} outside [{low}, {high}]")]
    RangeViolation {
        /// Site or coupler carrying the value.
        target: ValueTarget,
        /// The offending value.
        value: f64,
        /// Declared lower bound.
        low: f64,
        /// Declared upper bound.
        high: f64,
    },
    /// A bias was assigned to a site that is not active.
    #[error("site {site} is not active in the topology")]
    UnknownSite {
        /// The unknown site.
        site: SiteId,
    },
    /// A weight was assigned to a coupler that is not present.
    #[error("coupler {coupler} is not present in the topology")]
    UnknownCoupler {
        /// The unknown coupler.
        coupler: Coupler,
    },
    /// An exported record is structurally inconsistent.
    #[error("malformed instance record: {reason}")]
    MalformedRecord {
        /// What was wrong with the record.
        reason: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`BqpError`] variants.
    enum BqpErrorCode for BqpError {
        /// A generator or topology parameter was rejected.
        InvalidParameter => InvalidParameter { .. } => "BQP_INVALID_PARAMETER",
        /// A value range was degenerate.
        DegenerateRange => DegenerateRange { .. } => "BQP_DEGENERATE_RANGE",
        /// Degree filtering exceeded the available degree.
        DegreeExceeded => DegreeExceeded { .. } => "BQP_DEGREE_EXCEEDED",
        /// The degree is not a multiple of three.
        DegreeNotMultipleOfThree => DegreeNotMultipleOfThree { .. } => "BQP_DEGREE_NOT_MULTIPLE_OF_THREE",
        /// A coupler was a self loop.
        SelfLoop => SelfLoop { .. } => "BQP_SELF_LOOP",
        /// A coupler was duplicated.
        DuplicateCoupler => DuplicateCoupler { .. } => "BQP_DUPLICATE_COUPLER",
        /// A coupler endpoint was inactive.
        UnknownEndpoint => UnknownEndpoint { .. } => "BQP_UNKNOWN_ENDPOINT",
        /// A site did not decode inside the lattice.
        SiteOutsideLattice => SiteOutsideLattice { .. } => "BQP_SITE_OUTSIDE_LATTICE",
        /// The topology was too small.
        TopologyTooSmall => TopologyTooSmall { .. } => "BQP_TOPOLOGY_TOO_SMALL",
        /// A value was out of range.
        RangeViolation => RangeViolation { .. } => "BQP_RANGE_VIOLATION",
        /// A site was unknown.
        UnknownSite => UnknownSite { .. } => "BQP_UNKNOWN_SITE",
        /// A coupler was unknown.
        UnknownCoupler => UnknownCoupler { .. } => "BQP_UNKNOWN_COUPLER",
        /// A record was malformed.
        MalformedRecord => MalformedRecord { .. } => "BQP_MALFORMED_RECORD",
    }
}

impl BqpError {
    /// Classify the error into the coarse taxonomy used for reporting.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter { .. }
            | Self::DegenerateRange { .. }
            | Self::DegreeExceeded { .. }
            | Self::DegreeNotMultipleOfThree { .. }
            | Self::SelfLoop { .. }
            | Self::DuplicateCoupler { .. }
            | Self::UnknownEndpoint { .. }
            | Self::SiteOutsideLattice { .. } => ErrorKind::Configuration,
            Self::TopologyTooSmall { .. } => ErrorKind::TopologyTooSmall,
            Self::RangeViolation { .. } => ErrorKind::RangeViolation,
            Self::UnknownSite { .. } | Self::UnknownCoupler { .. } | Self::MalformedRecord { .. } => {
                ErrorKind::Validation
            }
        }
    }

    pub(crate) fn invalid_parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }
}

/// Non-fatal report raised when the frustrated-loop generator stops before
/// reaching its target loop length.
///
/// The partially built instance is still returned; this value describes the
/// shortfall so callers can surface it.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[error(
    "accepted loop length {achieved_length} of target {target_length:.2} after {accepted_loops} loop(s); the {limit} budget ran out"
)]
pub struct InsufficientLoops {
    /// `alpha * |sites|`.
    pub target_length: f64,
    /// Sum of the accepted loop lengths.
    pub achieved_length: usize,
    /// Number of accepted loops.
    pub accepted_loops: usize,
    /// The budget that stopped sampling.
    pub limit: BudgetLimit,
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, BqpError>;
