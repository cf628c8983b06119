//! TourForge Solver Engine
//!
//! This crate provides the parallel tour optimizer:
//! - PMX recombination and 3-opt local search ([`heuristic`])
//! - Task-based and thread-pool worker mechanisms ([`mechanism`])
//! - The epoch/phase orchestrator with timeouts and abort ([`manager`])
//! - Event system for monitoring ([`event`])
//! - Shared run statistics ([`statistics`])

pub mod event;
pub mod heuristic;
pub mod manager;
pub mod mechanism;
pub mod statistics;
pub mod termination;

pub use event::{
    BestRouteUpdate, ChannelEventListener, CountingEventListener, LoggingEventListener,
    SolverEvent, SolverEventListener, SolverEventSupport, StatusUpdate,
};
pub use heuristic::{
    pmx_child, CrossoverWindow, EdgeTriple, PmxCrossover, Reconnection, ScoredTour,
    ThreeOptSearch, TourRing,
};
pub use manager::{
    ParallelSolver, Phase, PhaseTimeouts, RunReport, SolverHandle, SolverJob, SolverManager,
    StartRequest, TimeoutUpdate,
};
pub use mechanism::{
    BarrierOutcome, Job, Mechanism, TaskMechanism, ThreadPoolMechanism, WorkerHandle,
    WorkerState,
};
pub use statistics::{PhaseRecord, SolutionCounter};
pub use termination::CancelSignal;
