//! Thread-pool mechanism with busy-poll idle detection.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tourforge_config::MechanismKind;
use tourforge_core::{Result, TourForgeError};
use tracing::debug;

use super::{run_guarded, BarrierOutcome, Job, Mechanism, WorkerHandle};
use crate::termination::CancelSignal;

/// Interval between pending-count checks at the barrier.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs jobs on a fixed-size rayon pool.
///
/// The barrier polls a per-phase pending counter. Jobs abandoned by a
/// timed-out phase keep occupying pool threads until they finish, so the
/// next phase's jobs queue behind them.
#[derive(Debug)]
pub struct ThreadPoolMechanism {
    pool: ThreadPool,
    workers: usize,
    next_id: usize,
    pending: Arc<AtomicUsize>,
}

impl ThreadPoolMechanism {
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("tourforge-worker-{i}"))
            .build()
            .map_err(|e| TourForgeError::Io(io::Error::other(e)))?;
        debug!(event = "mechanism_start", mechanism = "threads", workers = workers);
        Ok(Self {
            pool,
            workers,
            next_id: 0,
            pending: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Jobs of the current phase that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl Mechanism for ThreadPoolMechanism {
    fn spawn(&mut self, job: Job) -> WorkerHandle {
        let handle = WorkerHandle::new(self.next_id);
        self.next_id += 1;

        let pending = Arc::clone(&self.pending);
        pending.fetch_add(1, Ordering::SeqCst);
        let worker = handle.clone();
        self.pool.spawn(move || {
            run_guarded(job, &worker);
            pending.fetch_sub(1, Ordering::SeqCst);
        });
        handle
    }

    fn barrier_wait(
        &mut self,
        _handles: &[WorkerHandle],
        timeout: Duration,
        cancel: &CancelSignal,
    ) -> BarrierOutcome {
        let deadline = Instant::now() + timeout;
        loop {
            if cancel.is_cancelled() {
                return BarrierOutcome::Cancelled;
            }
            if self.pending.load(Ordering::SeqCst) == 0 {
                return BarrierOutcome::Completed;
            }
            if Instant::now() >= deadline {
                return BarrierOutcome::TimedOut;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn cleanup(&mut self) {
        // Abandoned jobs decrement the old counter.
        self.pending = Arc::new(AtomicUsize::new(0));
    }

    fn kind(&self) -> MechanismKind {
        MechanismKind::Threads
    }
}
