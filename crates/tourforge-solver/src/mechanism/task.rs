//! Task-based mechanism on a tokio runtime.

use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tourforge_config::MechanismKind;
use tourforge_core::Result;
use tracing::debug;

use super::{run_guarded, BarrierOutcome, Job, Mechanism, WorkerHandle};
use crate::termination::CancelSignal;

/// Runs every job as a blocking task on a runtime owned by the mechanism.
///
/// The blocking pool grows on demand, so jobs abandoned by a timed-out phase
/// never delay the next phase's workers.
#[derive(Debug)]
pub struct TaskMechanism {
    runtime: Option<Runtime>,
    workers: usize,
    next_id: usize,
    tasks: Vec<(usize, JoinHandle<()>)>,
}

impl TaskMechanism {
    /// Creates a mechanism sized for `workers` concurrent jobs per phase.
    pub fn new(workers: usize) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tourforge-task")
            .enable_time()
            .build()?;
        debug!(event = "mechanism_start", mechanism = "tasks", workers = workers);
        Ok(Self {
            runtime: Some(runtime),
            workers,
            next_id: 0,
            tasks: Vec::with_capacity(workers),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Jobs spawned since the last cleanup.
    pub fn tracked_tasks(&self) -> usize {
        self.tasks.len()
    }
}

impl Mechanism for TaskMechanism {
    fn spawn(&mut self, job: Job) -> WorkerHandle {
        let handle = WorkerHandle::new(self.next_id);
        self.next_id += 1;

        let Some(runtime) = &self.runtime else {
            return handle;
        };
        let worker = handle.clone();
        let join = runtime.spawn_blocking(move || run_guarded(job, &worker));
        self.tasks.push((handle.id(), join));
        handle
    }

    fn barrier_wait(
        &mut self,
        handles: &[WorkerHandle],
        timeout: Duration,
        cancel: &CancelSignal,
    ) -> BarrierOutcome {
        if cancel.is_cancelled() {
            return BarrierOutcome::Cancelled;
        }
        let Some(runtime) = &self.runtime else {
            return BarrierOutcome::Completed;
        };

        let (waiting, rest): (Vec<_>, Vec<_>) = self
            .tasks
            .drain(..)
            .partition(|(id, _)| handles.iter().any(|h| h.id() == *id));
        self.tasks = rest;

        runtime.block_on(async {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => BarrierOutcome::Cancelled,
                _ = async {
                    for (_, join) in waiting {
                        // Panics are caught inside the job; a join error only
                        // means the runtime is shutting down.
                        let _ = join.await;
                    }
                } => BarrierOutcome::Completed,
                _ = tokio::time::sleep(timeout) => BarrierOutcome::TimedOut,
            }
        })
    }

    fn cleanup(&mut self) {
        // Dropping a JoinHandle detaches the task.
        self.tasks.clear();
    }

    fn kind(&self) -> MechanismKind {
        MechanismKind::Tasks
    }
}

impl Drop for TaskMechanism {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
