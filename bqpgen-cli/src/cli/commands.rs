//! Argument parsing and command execution for the bqpgen CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use bqpgen_core::{
    BqpError, BqpErrorCode, FlParams, GeneratorConfig, GeneratorKind, InstanceRecord, Provenance,
    RanParams, RejectCounting, Topology, WscnParams, effective_wscn_degree, generate_instance,
};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::config::{ConfigError, DEFAULT_CONFIG_FILE, load_config, merge_config};
use super::hardware::{HardwareError, HardwareSnapshot};

const DEFAULT_HARDWARE_DEGREE: usize = 12;
const WSCN_MIN_DEGREE: usize = 6;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "bqpgen",
    about = "Generate benchmark Ising instances for chimera processors."
)]
pub struct Cli {
    /// Options shared by every generator.
    #[command(flatten)]
    pub options: GlobalOptions,

    /// Generator to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Options that may also come from the config file.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    /// JSON file holding defaults for the options below.
    #[arg(short = 'c', long = "config-file", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Seed for the random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Restrict generation to the top-left square of this many unit cells.
    #[arg(long = "chimera-degree")]
    pub chimera_degree: Option<usize>,

    /// Unit cells per side of the hardware lattice (default 12).
    #[arg(long = "hardware-chimera-degree")]
    pub hardware_chimera_degree: Option<usize>,

    /// JSON snapshot of the processor's qubits, couplers and ranges.
    #[arg(long = "hardware-file")]
    pub hardware_file: Option<PathBuf>,

    /// Endpoint of the processor, recorded in the metadata.
    #[arg(long = "dw-url")]
    pub dw_url: Option<String>,

    /// Solver name, recorded in the metadata.
    #[arg(long = "solver-name")]
    pub solver_name: Option<String>,
}

/// Supported generators.
#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum Command {
    /// Random discretized couplings.
    Ran(RanArgs),
    /// Native clique embedding.
    Clq,
    /// Planted frustrated loops.
    Fl(FlArgs),
    /// Weak-strong cluster network.
    Wscn(WscnArgs),
}

impl Command {
    /// Generator selected by this command.
    #[must_use]
    pub const fn kind(&self) -> GeneratorKind {
        match self {
            Self::Ran(_) => GeneratorKind::Ran,
            Self::Clq => GeneratorKind::Clq,
            Self::Fl(_) => GeneratorKind::Fl,
            Self::Wscn(_) => GeneratorKind::Wscn,
        }
    }

    /// Core configuration equivalent to the parsed arguments.
    #[must_use]
    pub fn config(&self) -> GeneratorConfig {
        match self {
            Self::Ran(args) => GeneratorConfig::Ran(RanParams {
                steps: args.steps,
                field: args.field,
            }),
            Self::Clq => GeneratorConfig::Clq,
            Self::Fl(args) => GeneratorConfig::Fl(FlParams {
                steps: args.steps,
                alpha: args.alpha,
                min_loop_length: args.min_loop_length,
                loop_reject_limit: args.loop_reject_limit,
                loop_sample_limit: args.loop_sample_limit,
                reject_counting: args.reject_counting.into(),
            }),
            Self::Wscn(args) => GeneratorConfig::Wscn(WscnParams {
                weak_field: args.weak_field,
                strong_field: args.strong_field,
            }),
        }
    }
}

/// Options of the `ran` generator.
#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct RanArgs {
    /// Number of magnitude levels per sign.
    #[arg(short, long, default_value_t = RanParams::default().steps)]
    pub steps: u32,

    /// Also draw random site biases.
    #[arg(short, long)]
    pub field: bool,
}

/// Options of the `fl` generator.
#[derive(Debug, Args, Clone, PartialEq)]
pub struct FlArgs {
    /// Number of coupler weight units per full-scale value.
    #[arg(short, long, default_value_t = FlParams::default().steps)]
    pub steps: u32,

    /// Ratio of total loop length to active sites.
    #[arg(short, long, default_value_t = FlParams::default().alpha)]
    pub alpha: f64,

    /// Shortest loop that may be planted.
    #[arg(long = "min-loop-length", default_value_t = FlParams::default().min_loop_length)]
    pub min_loop_length: usize,

    /// Rejected walks tolerated before stopping.
    #[arg(long = "loop-reject-limit", default_value_t = FlParams::default().loop_reject_limit)]
    pub loop_reject_limit: usize,

    /// Walks sampled before stopping.
    #[arg(long = "loop-sample-limit", default_value_t = FlParams::default().loop_sample_limit)]
    pub loop_sample_limit: usize,

    /// Whether an accepted loop resets the rejection count.
    #[arg(long = "reject-counting", value_enum, default_value_t = RejectMode::Consecutive)]
    pub reject_counting: RejectMode,
}

/// Command-line spelling of [`RejectCounting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RejectMode {
    /// Count rejections since the last accepted loop.
    Consecutive,
    /// Count every rejection.
    Cumulative,
}

impl From<RejectMode> for RejectCounting {
    fn from(mode: RejectMode) -> Self {
        match mode {
            RejectMode::Consecutive => Self::Consecutive,
            RejectMode::Cumulative => Self::Cumulative,
        }
    }
}

/// Options of the `wscn` generator.
#[derive(Debug, Args, Clone, PartialEq)]
pub struct WscnArgs {
    /// Bias on weak-cluster sites.
    #[arg(
        long = "weak-field",
        allow_hyphen_values = true,
        default_value_t = WscnParams::default().weak_field
    )]
    pub weak_field: f64,

    /// Bias on strong-cluster sites.
    #[arg(
        long = "strong-field",
        allow_hyphen_values = true,
        default_value_t = WscnParams::default().strong_field
    )]
    pub strong_field: f64,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The config file could not be read or applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The hardware snapshot could not be read.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
    /// Topology construction or generation failed.
    #[error(transparent)]
    Core(#[from] BqpError),
}

impl CliError {
    /// Stable code of the underlying core error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<BqpErrorCode> {
        match self {
            Self::Core(err) => Some(err.code()),
            Self::Config(_) | Self::Hardware(_) => None,
        }
    }
}

/// Executes `cli`, stamping the record with the current UTC time.
///
/// # Errors
/// Returns [`CliError`] when configuration, topology loading or generation
/// fails.
pub fn run_cli(cli: Cli) -> Result<InstanceRecord, CliError> {
    run_cli_at(cli, Utc::now())
}

/// Executes `cli`, stamping the record with `generated`.
///
/// # Errors
/// Returns [`CliError`] when configuration, topology loading or generation
/// fails.
///
/// # Examples
/// ```
/// # use bqpgen_cli::cli::{Cli, run_cli_at};
/// # use clap::Parser;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cli = Cli::try_parse_from([
///     "bqpgen", "--seed", "1", "--hardware-chimera-degree", "2", "ran", "--steps", "2",
/// ])?;
/// let record = run_cli_at(cli, chrono::DateTime::UNIX_EPOCH)?;
/// assert_eq!(record.quadratic_terms.len(), 80);
/// assert_eq!(record.metadata.provenance.generated.as_deref(), Some("1970-01-01T00:00:00Z"));
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli, generated),
    fields(generator = %cli.command.kind(), seed = field::Empty, degree = field::Empty)
)]
pub fn run_cli_at(cli: Cli, generated: DateTime<Utc>) -> Result<InstanceRecord, CliError> {
    let Cli {
        mut options,
        command,
    } = cli;
    if let Some(entries) = load_config(&options.config_file)? {
        merge_config(&mut options, &entries)?;
    }
    let seed = options.seed.unwrap_or_else(|| {
        let drawn = rand::random();
        info!(seed = drawn, "no seed supplied, drew one from entropy");
        drawn
    });
    let span = Span::current();
    span.record("seed", seed);

    let topology = load_topology(&options)?;
    let topology = match command {
        Command::Wscn(_) => wscn_view(&topology)?,
        _ => topology,
    };
    span.record("degree", topology.degree());

    let provenance = Provenance {
        generated: Some(generated.to_rfc3339_opts(SecondsFormat::Secs, true)),
        dw_url: options.dw_url,
        solver_name: options.solver_name,
    };
    let record = generate_instance(&topology, &command.config(), seed, provenance)?;
    info!(
        sites = record.variable_ids.len(),
        linear = record.linear_terms.len(),
        quadratic = record.quadratic_terms.len(),
        "command completed"
    );
    Ok(record)
}

/// Builds the hardware topology and applies `--chimera-degree`.
#[instrument(
    name = "cli.load_topology",
    err,
    skip(options),
    fields(source = field::Empty, hardware_degree = field::Empty)
)]
pub(super) fn load_topology(options: &GlobalOptions) -> Result<Topology, CliError> {
    let hardware_degree = options
        .hardware_chimera_degree
        .unwrap_or(DEFAULT_HARDWARE_DEGREE);
    let span = Span::current();
    span.record("hardware_degree", hardware_degree);
    let topology = match &options.hardware_file {
        Some(path) => {
            span.record("source", field::display("snapshot"));
            HardwareSnapshot::load(path)?.into_topology(hardware_degree)?
        }
        None => {
            span.record("source", field::display("full_yield"));
            info!(
                degree = hardware_degree,
                "no hardware snapshot, assuming a full-yield lattice"
            );
            Topology::synthesize_full_yield(hardware_degree)?
        }
    };
    match options.chimera_degree {
        Some(degree) => {
            info!(degree, "filtering to a smaller chimera lattice");
            Ok(topology.filter_to_degree(degree)?)
        }
        None => Ok(topology),
    }
}

/// Weak-strong cluster networks need two tiles per side and occupy the
/// largest multiple of three.
pub(super) fn wscn_view(topology: &Topology) -> Result<Topology, CliError> {
    let degree = topology.degree();
    if degree < WSCN_MIN_DEGREE {
        return Err(BqpError::TopologyTooSmall {
            generator: "wscn",
            required_degree: WSCN_MIN_DEGREE,
            actual_degree: degree,
        }
        .into());
    }
    let effective = effective_wscn_degree(degree);
    if effective != degree {
        info!(
            degree,
            effective, "weak-strong cluster network occupies a smaller lattice"
        );
    }
    Ok(topology.filter_to_degree(effective)?)
}

/// Writes `record` to `writer` as pretty-printed JSON followed by a newline.
///
/// # Errors
/// Returns [`io::Error`] if serialization or writing fails.
pub fn render_record(record: &InstanceRecord, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, record)?;
    writeln!(writer)
}
