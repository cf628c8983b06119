//! Run orchestration and remote control.
//!
//! # Overview
//!
//! The manager module provides:
//! - [`ParallelSolver`]: the epoch/phase loop over a [`Mechanism`](crate::mechanism::Mechanism)
//! - [`SolverHandle`]: abort and live timeout updates from another thread
//! - [`SolverManager`] / [`SolverJob`]: background runs fed by [`StartRequest`]
//!   and [`TimeoutUpdate`] messages, with events delivered over a channel
//!
//! # Run shape
//!
//! Each epoch runs PMX recombination (phase 1), then 3-opt local search
//! (phase 2). Every phase spawns one worker per engaged mechanism and waits
//! at a barrier bounded by the phase timeout. A status event follows every
//! phase; a best-route event follows every strict improvement of the global
//! best.

mod handle;
mod message;
mod solver;
mod solver_manager;
mod timeouts;


pub use handle::SolverHandle;
pub use message::{StartRequest, TimeoutUpdate};
pub use solver::{ParallelSolver, RunReport};
pub use solver_manager::{SolverJob, SolverManager};
pub use timeouts::{Phase, PhaseTimeouts};
