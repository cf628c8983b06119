//! Control messages exchanged with a remote front-end.
//!
//! Field names follow the camelCase JSON used on the wire. Durations are
//! signed so that negative values from a client are rejected instead of
//! failing to parse.

use serde::{Deserialize, Serialize};
use tourforge_config::{MechanismKind, SolverConfig};
use tourforge_core::{Point, Result, TourForgeError};

/// Request to start a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub first_phase_duration_ms: i64,
    pub second_phase_duration_ms: i64,
    #[serde(rename = "mechanismKind", alias = "mechanism")]
    pub mechanism: MechanismKind,
    pub mechanisms_engaged: i64,
    #[serde(default = "default_start_epoch")]
    pub start_epoch: u64,
    pub max_epochs: u64,
    pub points: Vec<Point>,
    #[serde(default)]
    pub solutions_already_counted: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_best_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

fn default_start_epoch() -> u64 {
    1
}

impl StartRequest {
    /// Creates a request from a configuration and a point set.
    pub fn from_config(config: &SolverConfig, points: Vec<Point>) -> Self {
        Self {
            first_phase_duration_ms: i64::try_from(config.first_phase_timeout_ms)
                .unwrap_or(i64::MAX),
            second_phase_duration_ms: i64::try_from(config.second_phase_timeout_ms)
                .unwrap_or(i64::MAX),
            mechanism: config.mechanism,
            mechanisms_engaged: i64::try_from(config.mechanisms_engaged).unwrap_or(i64::MAX),
            start_epoch: config.start_epoch,
            max_epochs: config.max_epochs,
            points,
            solutions_already_counted: config.solutions_already_counted,
            starting_best_distance: config.starting_best_distance,
            random_seed: config.random_seed,
        }
    }

    /// Checks the request and converts it to a run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TourForgeError::Config`] when fewer than two points are
    /// given, a point is not finite, a duration is not positive, fewer than
    /// one worker is engaged or the epoch range is empty.
    pub fn to_config(&self) -> Result<SolverConfig> {
        if self.points.len() < 2 {
            return Err(TourForgeError::config(format!(
                "at least 2 points are required, got {}",
                self.points.len()
            )));
        }
        if let Some(index) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(TourForgeError::config(format!(
                "point {index} has non-finite coordinates"
            )));
        }
        let first = positive_millis("firstPhaseDurationMs", self.first_phase_duration_ms)?;
        let second = positive_millis("secondPhaseDurationMs", self.second_phase_duration_ms)?;
        let workers = usize::try_from(self.mechanisms_engaged)
            .ok()
            .filter(|&w| w >= 1)
            .ok_or_else(|| {
                TourForgeError::config(format!(
                    "mechanismsEngaged must be at least 1, got {}",
                    self.mechanisms_engaged
                ))
            })?;

        let mut config = SolverConfig::new()
            .with_mechanism(self.mechanism)
            .with_mechanisms_engaged(workers)
            .with_phase_timeouts_ms(first, second)
            .with_epochs(self.start_epoch, self.max_epochs)
            .with_solutions_already_counted(self.solutions_already_counted);
        config.starting_best_distance = self.starting_best_distance;
        config.random_seed = self.random_seed;
        config.validate()?;
        Ok(config)
    }
}

/// Live update of a running solve: new phase timeouts, or an abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutUpdate {
    #[serde(default)]
    pub first_phase_duration_ms: i64,
    #[serde(default)]
    pub second_phase_duration_ms: i64,
    #[serde(default)]
    pub abort: bool,
}

impl TimeoutUpdate {
    pub fn timeouts(first_ms: u64, second_ms: u64) -> Self {
        Self {
            first_phase_duration_ms: i64::try_from(first_ms).unwrap_or(i64::MAX),
            second_phase_duration_ms: i64::try_from(second_ms).unwrap_or(i64::MAX),
            abort: false,
        }
    }

    pub fn abort() -> Self {
        Self {
            first_phase_duration_ms: 0,
            second_phase_duration_ms: 0,
            abort: true,
        }
    }

    /// Both durations as positive milliseconds.
    pub fn validated(&self) -> Result<(u64, u64)> {
        Ok((
            positive_millis("firstPhaseDurationMs", self.first_phase_duration_ms)?,
            positive_millis("secondPhaseDurationMs", self.second_phase_duration_ms)?,
        ))
    }
}

fn positive_millis(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .ok()
        .filter(|&ms| ms > 0)
        .ok_or_else(|| TourForgeError::config(format!("{name} must be > 0, got {value}")))
}
