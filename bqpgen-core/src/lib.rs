//! bqpgen core library.
//!
//! Generates synthetic Ising (BQP) benchmark instances over the chimera
//! interconnect of a quantum annealer: discretized random couplings,
//! native clique embeddings, frustrated loops and weak-strong cluster
//! networks.

mod error;
mod generators;
mod instance;
mod pipeline;
mod range;
mod sampler;
mod topology;

pub use crate::{
    error::{BqpError, BqpErrorCode, ErrorKind, InsufficientLoops, Result, ValueTarget},
    generators::{
        Assignment, ClqGenerator, CliqueReport, FlGenerator, FlParams, GenerationReport,
        Generator, GeneratorKind, RanGenerator, RanParams, WscnGenerator, WscnParams,
        effective_wscn_degree,
    },
    instance::{
        BQP_VERSION, InstanceBuilder, InstanceMetadata, InstanceRecord, LinearTerm, Provenance,
        QuadraticTerm, build_record,
    },
    pipeline::{GeneratorConfig, generate_instance},
    range::ValueRange,
    sampler::{
        BudgetLimit, Loop, LoopReport, LoopSampler, RejectCounting, SamplerState, SamplingBudget,
        SamplingSession, WalkOutcome,
    },
    topology::{
        CELL_SIZE, ChimeraCoordinate, Coupler, SHORE_SIZE, Shore, SiteId, Topology, infer_degree,
    },
};
