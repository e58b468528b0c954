//! Support library for the bqpgen binary.
//!
//! Exposes the CLI and logging modules so tests can drive the command
//! pipeline without spawning a subprocess.

pub mod cli;
pub mod logging;
