//! JSON configuration file supplying defaults for the top-level options.
//!
//! The file holds a flat object. Keys named after a top-level option fill it
//! when the command line left it unset; everything else is logged and
//! ignored.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::commands::GlobalOptions;

/// Config file read when `--config-file` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "_config";

/// Errors raised while reading or applying a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read, or an explicit path is missing.
    #[error("failed to open config file `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid JSON.
    #[error("config file `{path}` is not a valid JSON document: {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
    /// The top-level value is not an object.
    #[error("config file `{path}` must hold a JSON object")]
    NotAnObject {
        /// Offending file.
        path: PathBuf,
    },
    /// A key held an array or object.
    #[error("config key `{key}` holds a nested value; only single values are allowed")]
    NestedValue {
        /// Offending key.
        key: String,
    },
    /// A key held a scalar of the wrong type.
    #[error("config key `{key}` expects {expected}, found `{found}`")]
    InvalidValue {
        /// Offending key.
        key: String,
        /// Description of the accepted values.
        expected: &'static str,
        /// The rejected value as JSON.
        found: String,
    },
}

/// Reads the config file at `path`.
///
/// Returns `Ok(None)` when the default file is absent.
///
/// # Errors
/// Returns [`ConfigError`] when an explicitly named file is missing, the file
/// cannot be read or parsed, or it does not hold an object.
#[instrument(name = "cli.load_config", err, skip(path), fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<Option<Map<String, Value>>, ConfigError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(source)
            if source.kind() == io::ErrorKind::NotFound && path == Path::new(DEFAULT_CONFIG_FILE) =>
        {
            debug!("default config file absent");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    match value {
        Value::Object(entries) => Ok(Some(entries)),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Fills unset options from `entries`.
///
/// # Errors
/// Returns [`ConfigError::NestedValue`] for arrays or objects and
/// [`ConfigError::InvalidValue`] for scalars of the wrong type.
pub fn merge_config(
    options: &mut GlobalOptions,
    entries: &Map<String, Value>,
) -> Result<(), ConfigError> {
    for (key, value) in entries {
        if value.is_array() || value.is_object() {
            return Err(ConfigError::NestedValue { key: key.clone() });
        }
        if value.is_null() {
            continue;
        }
        match key.as_str() {
            "seed" => fill(&mut options.seed, key, integer(key, value)?),
            "chimera_degree" => fill(&mut options.chimera_degree, key, degree(key, value)?),
            "hardware_chimera_degree" => fill(
                &mut options.hardware_chimera_degree,
                key,
                degree(key, value)?,
            ),
            "hardware_file" => fill(&mut options.hardware_file, key, text(key, value)?.into()),
            "dw_url" => fill(&mut options.dw_url, key, text(key, value)?),
            "solver_name" => fill(&mut options.solver_name, key, text(key, value)?),
            _ => warn!(key = key.as_str(), "ignoring unknown config key"),
        }
    }
    Ok(())
}

fn fill<T: std::fmt::Debug>(slot: &mut Option<T>, key: &str, value: T) {
    match slot {
        Some(current) => info!(key, ?current, "command line overrides config key"),
        None => *slot = Some(value),
    }
}

fn invalid(key: &str, expected: &'static str, value: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        expected,
        found: value.to_string(),
    }
}

fn integer(key: &str, value: &Value) -> Result<u64, ConfigError> {
    value
        .as_u64()
        .ok_or_else(|| invalid(key, "a non-negative integer", value))
}

fn degree(key: &str, value: &Value) -> Result<usize, ConfigError> {
    integer(key, value)
        .and_then(|raw| usize::try_from(raw).map_err(|_| invalid(key, "a lattice degree", value)))
}

/// Strings pass through; numbers are accepted as their decimal text.
fn text(key: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(raw) => Ok(raw.clone()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(invalid(key, "a string", value)),
    }
}
