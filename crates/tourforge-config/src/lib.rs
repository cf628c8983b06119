//! Configuration system for TourForge.
//!
//! Load run configuration from TOML or YAML files to control the worker
//! mechanism, phase timeouts and epoch range without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use tourforge_config::{MechanismKind, SolverConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     mechanism = "threads"
//!     mechanisms_engaged = 8
//!     first_phase_timeout_ms = 250
//!     second_phase_timeout_ms = 1500
//!     max_epochs = 50
//! "#).unwrap();
//!
//! assert_eq!(config.mechanism, MechanismKind::Threads);
//! assert_eq!(config.first_phase_timeout(), Duration::from_millis(250));
//! assert!(config.validate().is_ok());
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use tourforge_config::SolverConfig;
//!
//! let config = SolverConfig::load("tourforge.toml").unwrap_or_default();
//! assert_eq!(config.mechanisms_engaged, 4);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tourforge_core::TourForgeError;

/// Default number of workers per phase.
pub const DEFAULT_MECHANISMS_ENGAGED: usize = 4;
/// Default recombination phase timeout.
pub const DEFAULT_FIRST_PHASE_TIMEOUT_MS: u64 = 1_000;
/// Default local search phase timeout.
pub const DEFAULT_SECOND_PHASE_TIMEOUT_MS: u64 = 2_000;
/// Default last epoch (inclusive).
pub const DEFAULT_MAX_EPOCHS: u64 = 10;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for TourForgeError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => TourForgeError::Io(io),
            other => TourForgeError::Config(other.to_string()),
        }
    }
}

/// Worker scheduling substrate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    /// Managed task pool (tokio blocking tasks).
    #[default]
    #[serde(alias = "Tasks", alias = "TaskBased", alias = "task_based")]
    Tasks,

    /// Fixed-size worker thread pool with busy-poll idle detection.
    #[serde(alias = "Threads", alias = "ThreadBased", alias = "thread_based")]
    Threads,
}

impl MechanismKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MechanismKind::Tasks => "tasks",
            MechanismKind::Threads => "threads",
        }
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MechanismKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tasks" | "task" | "task_based" | "taskbased" => Ok(MechanismKind::Tasks),
            "threads" | "thread" | "thread_based" | "threadbased" => Ok(MechanismKind::Threads),
            other => Err(ConfigError::Invalid(format!(
                "unknown mechanism `{other}` (expected `tasks` or `threads`)"
            ))),
        }
    }
}

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolverConfig {
    /// Worker scheduling substrate.
    pub mechanism: MechanismKind,

    /// Number of concurrent workers per phase.
    pub mechanisms_engaged: usize,

    /// Recombination phase timeout in milliseconds.
    pub first_phase_timeout_ms: u64,

    /// Local search phase timeout in milliseconds.
    pub second_phase_timeout_ms: u64,

    /// First epoch to run (resumed runs start later than 1).
    pub start_epoch: u64,

    /// Last epoch to run, inclusive.
    pub max_epochs: u64,

    /// Best distance already known from an earlier run.
    pub starting_best_distance: Option<f64>,

    /// Solutions counted by earlier runs; the counter starts here.
    pub solutions_already_counted: u64,

    /// Random seed for reproducible recombination.
    pub random_seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mechanism: MechanismKind::default(),
            mechanisms_engaged: DEFAULT_MECHANISMS_ENGAGED,
            first_phase_timeout_ms: DEFAULT_FIRST_PHASE_TIMEOUT_MS,
            second_phase_timeout_ms: DEFAULT_SECOND_PHASE_TIMEOUT_MS,
            start_epoch: 1,
            max_epochs: DEFAULT_MAX_EPOCHS,
            starting_best_distance: None,
            solutions_already_counted: 0,
            random_seed: None,
        }
    }
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn with_mechanism(mut self, mechanism: MechanismKind) -> Self {
        self.mechanism = mechanism;
        self
    }

    pub fn with_mechanisms_engaged(mut self, workers: usize) -> Self {
        self.mechanisms_engaged = workers;
        self
    }

    /// Sets both phase timeouts in milliseconds.
    pub fn with_phase_timeouts_ms(mut self, first: u64, second: u64) -> Self {
        self.first_phase_timeout_ms = first;
        self.second_phase_timeout_ms = second;
        self
    }

    /// Sets the inclusive epoch range.
    pub fn with_epochs(mut self, start_epoch: u64, max_epochs: u64) -> Self {
        self.start_epoch = start_epoch;
        self.max_epochs = max_epochs;
        self
    }

    pub fn with_starting_best_distance(mut self, distance: f64) -> Self {
        self.starting_best_distance = Some(distance);
        self
    }

    pub fn with_solutions_already_counted(mut self, count: u64) -> Self {
        self.solutions_already_counted = count;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn first_phase_timeout(&self) -> Duration {
        Duration::from_millis(self.first_phase_timeout_ms)
    }

    pub fn second_phase_timeout(&self) -> Duration {
        Duration::from_millis(self.second_phase_timeout_ms)
    }

    /// Checks the run parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a phase timeout is zero, fewer
    /// than one worker is engaged, the epoch range is empty or the starting
    /// best distance is negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mechanisms_engaged < 1 {
            return Err(ConfigError::Invalid(
                "mechanisms_engaged must be at least 1".to_string(),
            ));
        }
        if self.first_phase_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "first_phase_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.second_phase_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "second_phase_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.start_epoch > self.max_epochs {
            return Err(ConfigError::Invalid(format!(
                "start_epoch ({}) must not exceed max_epochs ({})",
                self.start_epoch, self.max_epochs
            )));
        }
        if let Some(distance) = self.starting_best_distance {
            if !distance.is_finite() || distance < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "starting_best_distance must be a finite, non-negative number, got {distance}"
                )));
            }
        }
        Ok(())
    }
}

/// Parses a duration with an optional unit suffix into milliseconds.
///
/// Accepts `ms`, `s` and `m` suffixes; a bare number is read as milliseconds.
///
/// ```
/// use tourforge_config::parse_duration_ms;
///
/// assert_eq!(parse_duration_ms("250").unwrap(), 250);
/// assert_eq!(parse_duration_ms("30s").unwrap(), 30_000);
/// assert_eq!(parse_duration_ms("2m").unwrap(), 120_000);
/// ```
pub fn parse_duration_ms(s: &str) -> Result<u64, ConfigError> {
    let s = s.trim();
    let (digits, multiplier) = if let Some(v) = s.strip_suffix("ms") {
        (v, 1)
    } else if let Some(v) = s.strip_suffix('s') {
        (v, 1_000)
    } else if let Some(v) = s.strip_suffix('m') {
        (v, 60_000)
    } else {
        (s, 1)
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("invalid duration `{s}`")))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| ConfigError::Invalid(format!("duration `{s}` is too large")))
}

#[cfg(test)]
mod tests;
