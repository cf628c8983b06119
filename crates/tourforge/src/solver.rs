//! Solver entry points that hide the orchestrator wiring.

use std::io;
use std::path::Path;

use tourforge_config::{ConfigError, SolverConfig};
use tourforge_core::{Point, Result};
use tourforge_solver::{LoggingEventListener, ParallelSolver, RunReport, SolverEventSupport};
use tracing::{debug, warn};

/// Configuration file picked up by [`solve`] from the working directory.
pub const CONFIG_FILE: &str = "tourforge.toml";

/// Optimizes `points` with the settings in [`CONFIG_FILE`], or the defaults
/// when no such file exists.
///
/// A config file that exists but cannot be read or parsed is an error.
pub fn solve(points: &[Point]) -> Result<RunReport> {
    let config = load_config(Path::new(CONFIG_FILE))?;
    solve_with(config, points)
}

fn load_config(path: &Path) -> Result<SolverConfig> {
    match SolverConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            debug!(event = "config_default", file = %path.display());
            Ok(SolverConfig::default())
        }
        Err(err) => {
            warn!(event = "config_rejected", file = %path.display(), error = %err);
            Err(err.into())
        }
    }
}

/// Optimizes `points` with an explicit configuration.
pub fn solve_with(config: SolverConfig, points: &[Point]) -> Result<RunReport> {
    #[cfg(feature = "console")]
    tourforge_console::init();

    let mut events = SolverEventSupport::new();
    events.add_listener(std::sync::Arc::new(LoggingEventListener::with_prefix(
        "tourforge",
    )));

    let mut solver = ParallelSolver::from_config(config, events)?;
    solver.run(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourforge_core::{total_distance, TourForgeError};
    use tourforge_test::{random_points, same_points};

    #[test]
    fn test_solve_with_keeps_points() {
        let points = random_points(9, 4);
        let config = SolverConfig::new()
            .with_mechanisms_engaged(2)
            .with_epochs(1, 2)
            .with_random_seed(1);

        let report = solve_with(config, &points).unwrap();

        assert!(same_points(&report.best, &points));
        assert!(report.best_distance <= total_distance(&points));
        assert_eq!(report.epochs_completed, 2);
    }

    #[test]
    fn test_solve_with_rejects_bad_config() {
        let config = SolverConfig::new().with_epochs(5, 2);
        assert!(solve_with(config, &random_points(5, 1)).is_err());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "mechanisms_engaged = \"many\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, TourForgeError::Config(_)), "{err:?}");
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "mechanisms_engaged = 3\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.mechanisms_engaged, 3);
    }
}
