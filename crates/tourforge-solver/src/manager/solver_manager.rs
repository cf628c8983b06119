//! Background runs driven by control messages.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::{self, error::TryRecvError};
use tourforge_config::SolverConfig;
use tourforge_core::{Point, Result, TourForgeError};
use tracing::debug;

use super::handle::SolverHandle;
use super::message::{StartRequest, TimeoutUpdate};
use super::solver::{ParallelSolver, RunReport};
use crate::event::{ChannelEventListener, SolverEvent, SolverEventListener, SolverEventSupport};

/// Starts runs on their own thread and hands back a [`SolverJob`].
///
/// Listeners registered here are attached to every run, next to the
/// channel that feeds [`SolverJob::next_event`].
#[derive(Debug, Default)]
pub struct SolverManager {
    listeners: Vec<Arc<dyn SolverEventListener>>,
}

impl SolverManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: Arc<dyn SolverEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Validates `request` and starts the run in the background.
    ///
    /// # Errors
    ///
    /// Returns [`TourForgeError::Config`] for an invalid request, or
    /// [`TourForgeError::Io`] when the mechanism or the run thread cannot be
    /// created.
    pub fn start(&self, request: StartRequest) -> Result<SolverJob> {
        let config = request.to_config()?;
        self.start_with_config(config, request.points)
    }

    pub fn start_with_config(&self, config: SolverConfig, points: Vec<Point>) -> Result<SolverJob> {
        if points.len() < 2 {
            return Err(TourForgeError::config(format!(
                "at least 2 points are required, got {}",
                points.len()
            )));
        }

        let (channel, events) = ChannelEventListener::channel();
        let mut support = SolverEventSupport::new();
        for listener in &self.listeners {
            support.add_listener(Arc::clone(listener));
        }
        support.add_listener(Arc::new(channel));

        let mut solver = ParallelSolver::from_config(config, support)?;
        let handle = solver.handle();
        handle.set_solving(true);

        let thread = thread::Builder::new()
            .name("tourforge-solver".to_string())
            .spawn(move || solver.run(&points))?;
        debug!(event = "job_started");

        Ok(SolverJob {
            handle,
            events,
            thread,
        })
    }
}

/// A run executing on a background thread.
#[derive(Debug)]
pub struct SolverJob {
    handle: SolverHandle,
    events: mpsc::UnboundedReceiver<SolverEvent>,
    thread: JoinHandle<Result<RunReport>>,
}

impl SolverJob {
    pub fn handle(&self) -> &SolverHandle {
        &self.handle
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Routes a live control message to the run.
    pub fn apply(&self, update: &TimeoutUpdate) -> Result<()> {
        self.handle.apply(update)
    }

    pub fn events(&mut self) -> &mut mpsc::UnboundedReceiver<SolverEvent> {
        &mut self.events
    }

    /// Blocks until the next event, or returns `None` once the run is over
    /// and every event was drained.
    ///
    /// Must not be called from inside an async runtime.
    pub fn next_event(&mut self) -> Option<SolverEvent> {
        self.events.blocking_recv()
    }

    pub fn try_next_event(&mut self) -> Option<SolverEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the run to end.
    ///
    /// # Errors
    ///
    /// Returns the run's own error, or [`TourForgeError::WorkerFailure`] if
    /// the run thread panicked.
    pub fn join(self) -> Result<RunReport> {
        self.thread
            .join()
            .map_err(|_| TourForgeError::worker_failure("solver thread panicked"))?
    }
}
