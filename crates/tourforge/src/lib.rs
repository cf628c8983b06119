//! TourForge - A Parallel Tour Optimizer in Rust
//!
//! Improves a closed tour through a set of points by alternating PMX
//! recombination and 3-opt local search on a pool of workers.
//!
//! # Example
//!
//! ```rust
//! use tourforge::prelude::*;
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(0.0, 1.0),
//! ];
//! let config = SolverConfig::new()
//!     .with_mechanisms_engaged(2)
//!     .with_epochs(1, 1)
//!     .with_random_seed(3);
//!
//! let report = tourforge::solve_with(config, &points).unwrap();
//! assert!(report.best_distance <= total_distance(&points));
//! ```

// Geometry and errors
pub use tourforge_core::{
    distance, total_distance, tsplib, Point, Result, TourForgeError,
};

// Configuration
pub use tourforge_config::{parse_duration_ms, ConfigError, MechanismKind, SolverConfig};

// Orchestration
pub use tourforge_solver::{
    BestRouteUpdate, ParallelSolver, RunReport, SolverEvent, SolverEventListener,
    SolverEventSupport, SolverHandle, SolverJob, SolverManager, StartRequest, StatusUpdate,
    TimeoutUpdate,
};

/// Event listeners, mechanisms and heuristics for custom wiring.
pub use tourforge_solver::{event, heuristic, manager, mechanism};

mod solver;
pub use solver::{solve, solve_with, CONFIG_FILE};

#[cfg(feature = "console")]
pub use tourforge_console as console;

pub mod prelude {
    pub use super::{solve, solve_with};
    pub use super::{total_distance, Point, Result, TourForgeError};
    pub use super::{MechanismKind, SolverConfig};
    pub use super::{
        BestRouteUpdate, RunReport, SolverEvent, SolverManager, StartRequest, StatusUpdate,
        TimeoutUpdate,
    };
}
