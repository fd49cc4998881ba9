//! Configuration loading for filevet services
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument / environment variable (handled by the binary)
//! 2. TOML config file (explicit path, or the platform default location)
//! 3. Compiled defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default listen port for filevet-vd
pub const DEFAULT_PORT: u16 = 5770;

/// Default bind address for filevet-vd
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Default cap on decoded upload size (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// CSV heuristic thresholds.
///
/// The defaults favor precision over recall: content that is probably CSV
/// but falls below a cutoff is rejected rather than accepted. Tuning the
/// cutoffs does not require touching the matching logic.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeuristicThresholds {
    /// Minimum fraction of non-empty lines containing at least one comma
    pub min_comma_ratio: f64,
    /// Minimum fraction of comma lines whose comma count matches the header
    pub min_uniform_ratio: f64,
    /// Relaxed comma-ratio floor applied when a `.csv` filename hint is present
    pub borderline_comma_ratio: f64,
    /// Relaxed uniform-ratio floor applied when a `.csv` filename hint is present
    pub borderline_uniform_ratio: f64,
    /// Minimum non-empty line count (header plus at least one data row)
    pub min_rows: usize,
}

impl Default for HeuristicThresholds {
    fn default() -> Self {
        Self {
            min_comma_ratio: 0.80,
            min_uniform_ratio: 0.70,
            borderline_comma_ratio: 0.70,
            borderline_uniform_ratio: 0.60,
            min_rows: 2,
        }
    }
}

/// Service configuration for filevet-vd
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address to bind the listener to
    pub bind_address: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum decoded payload size accepted by the validation endpoint
    pub max_upload_bytes: usize,
    /// CSV heuristic cutoffs
    pub thresholds: HeuristicThresholds,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            thresholds: HeuristicThresholds::default(),
        }
    }
}

/// Load service configuration.
///
/// An explicitly given path must exist and parse; a missing default-location
/// file silently falls back to compiled defaults.
pub fn load_service_config(cli_path: Option<&Path>) -> Result<ServiceConfig> {
    if let Some(path) = cli_path {
        return read_config_file(path);
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            return read_config_file(&path);
        }
    }

    Ok(ServiceConfig::default())
}

fn read_config_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Cannot parse {}: {}", path.display(), e)))
}

/// Default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("filevet").join("config.toml"))
}
