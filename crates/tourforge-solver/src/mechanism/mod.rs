//! Worker execution mechanisms.
//!
//! A [`Mechanism`] schedules units of work for one phase and joins them at a
//! barrier bounded by a timeout and the run's [`CancelSignal`]. Two
//! interchangeable implementations exist:
//!
//! - [`TaskMechanism`]: blocking tasks on a tokio runtime
//! - [`ThreadPoolMechanism`]: a fixed-size rayon pool with busy-poll idle detection
//!
//! Workers still running when a barrier returns are abandoned, not killed:
//! they finish in the background and their late results are ignored.

mod task;
mod thread;

use std::any::Any;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tourforge_config::MechanismKind;
use tourforge_core::Result;
use tracing::debug;

use crate::termination::CancelSignal;

pub use task::TaskMechanism;
pub use thread::ThreadPoolMechanism;

/// A unit of work handed to a mechanism.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// How a phase barrier returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierOutcome {
    /// Every worker finished (successfully or not).
    Completed,
    /// The phase timeout elapsed first.
    TimedOut,
    /// The run was cancelled first.
    Cancelled,
}

impl BarrierOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarrierOutcome::Completed => "completed",
            BarrierOutcome::TimedOut => "timed_out",
            BarrierOutcome::Cancelled => "cancelled",
        }
    }
}

/// Lifecycle of a spawned worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Pending,
    Running,
    Finished,
    /// The job panicked.
    Failed,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Pending,
            1 => WorkerState::Running,
            2 => WorkerState::Finished,
            _ => WorkerState::Failed,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, WorkerState::Finished | WorkerState::Failed)
    }
}

/// Observer for one spawned worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    slot: Arc<WorkerSlot>,
}

#[derive(Debug)]
struct WorkerSlot {
    id: usize,
    state: AtomicU8,
    failure: OnceLock<String>,
}

impl WorkerHandle {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            slot: Arc::new(WorkerSlot {
                id,
                state: AtomicU8::new(WorkerState::Pending as u8),
                failure: OnceLock::new(),
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.slot.id
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.slot.state.load(Ordering::Acquire))
    }

    /// Panic message of a failed worker.
    pub fn failure(&self) -> Option<&str> {
        self.slot.failure.get().map(String::as_str)
    }

    fn set_state(&self, state: WorkerState) {
        self.slot.state.store(state as u8, Ordering::Release);
    }
}

/// Runs `job`, recording its outcome on `handle`. Panics are contained.
pub(crate) fn run_guarded(job: Job, handle: &WorkerHandle) {
    handle.set_state(WorkerState::Running);
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(()) => handle.set_state(WorkerState::Finished),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            debug!(event = "worker_panic", worker = handle.id(), message = %message);
            let _ = handle.slot.failure.set(message);
            handle.set_state(WorkerState::Failed);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Scheduling substrate for phase workers.
pub trait Mechanism: Send + Debug {
    /// Schedules `job` for concurrent execution.
    fn spawn(&mut self, job: Job) -> WorkerHandle;

    /// Blocks until every handle is done, `timeout` elapses or `cancel`
    /// fires, whichever comes first.
    ///
    /// Must not be called from inside an async runtime.
    fn barrier_wait(
        &mut self,
        handles: &[WorkerHandle],
        timeout: Duration,
        cancel: &CancelSignal,
    ) -> BarrierOutcome;

    /// Releases per-phase bookkeeping. Abandoned workers keep running.
    fn cleanup(&mut self);

    fn kind(&self) -> MechanismKind;
}

impl<M: Mechanism + ?Sized> Mechanism for Box<M> {
    fn spawn(&mut self, job: Job) -> WorkerHandle {
        (**self).spawn(job)
    }

    fn barrier_wait(
        &mut self,
        handles: &[WorkerHandle],
        timeout: Duration,
        cancel: &CancelSignal,
    ) -> BarrierOutcome {
        (**self).barrier_wait(handles, timeout, cancel)
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }

    fn kind(&self) -> MechanismKind {
        (**self).kind()
    }
}

/// Creates the mechanism selected by configuration.
pub fn build(kind: MechanismKind, workers: usize) -> Result<Box<dyn Mechanism>> {
    let mechanism: Box<dyn Mechanism> = match kind {
        MechanismKind::Tasks => Box::new(TaskMechanism::new(workers)?),
        MechanismKind::Threads => Box::new(ThreadPoolMechanism::new(workers)?),
    };
    Ok(mechanism)
}
