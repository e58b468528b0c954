//! Command-line interface for the bqpgen generators.
//!
//! Options come from the command line first and the JSON config file
//! second. The topology is either a hardware snapshot or a synthesized
//! full-yield lattice, optionally filtered to a smaller degree.

mod commands;
mod config;
mod hardware;

pub use commands::{
    Cli, CliError, Command, FlArgs, GlobalOptions, RanArgs, RejectMode, WscnArgs, render_record,
    run_cli, run_cli_at,
};
pub use config::{ConfigError, DEFAULT_CONFIG_FILE, load_config, merge_config};
pub use hardware::{HardwareError, HardwareSnapshot};
