//! Control handle for a running solve.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tourforge_core::{Result, TourForgeError};
use tracing::info;

use super::message::TimeoutUpdate;
use super::timeouts::PhaseTimeouts;
use crate::termination::CancelSignal;

/// Handle for controlling a run from another thread.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tourforge_solver::manager::{PhaseTimeouts, SolverHandle};
///
/// let handle = SolverHandle::new(PhaseTimeouts::from_millis(1000, 2000));
/// handle.update_timeouts(250, 500).unwrap();
/// assert_eq!(handle.timeouts().first(), Duration::from_millis(250));
///
/// handle.abort();
/// assert!(handle.is_aborted());
/// ```
#[derive(Debug, Clone)]
pub struct SolverHandle {
    cancel: CancelSignal,
    timeouts: PhaseTimeouts,
    solving: Arc<AtomicBool>,
}

impl SolverHandle {
    pub fn new(timeouts: PhaseTimeouts) -> Self {
        Self {
            cancel: CancelSignal::new(),
            timeouts,
            solving: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancels the run. The run loop stops at the current barrier and emits
    /// no further events.
    pub fn abort(&self) {
        if !self.cancel.is_cancelled() {
            info!(event = "abort_requested");
        }
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Replaces both phase timeouts for phases that start from now on.
    ///
    /// # Errors
    ///
    /// Returns [`TourForgeError::Config`] when either timeout is zero.
    pub fn update_timeouts(&self, first_ms: u64, second_ms: u64) -> Result<()> {
        if first_ms == 0 || second_ms == 0 {
            return Err(TourForgeError::config(format!(
                "phase timeouts must be > 0, got {first_ms} ms / {second_ms} ms"
            )));
        }
        self.timeouts.update(first_ms, second_ms);
        info!(
            event = "timeouts_updated",
            first_phase_ms = first_ms,
            second_phase_ms = second_ms,
        );
        Ok(())
    }

    /// Routes a control message: abort when flagged, otherwise update the
    /// timeouts.
    pub fn apply(&self, update: &TimeoutUpdate) -> Result<()> {
        if update.abort {
            self.abort();
            return Ok(());
        }
        let (first_ms, second_ms) = update.validated()?;
        self.update_timeouts(first_ms, second_ms)
    }

    pub fn is_solving(&self) -> bool {
        self.solving.load(Ordering::SeqCst)
    }

    pub(crate) fn set_solving(&self, solving: bool) {
        self.solving.store(solving, Ordering::SeqCst);
    }

    pub fn timeouts(&self) -> &PhaseTimeouts {
        &self.timeouts
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn handle() -> SolverHandle {
        SolverHandle::new(PhaseTimeouts::from_millis(100, 200))
    }

    #[test]
    fn update_rejects_zero() {
        let handle = handle();
        assert!(handle.update_timeouts(0, 10).is_err());
        assert_eq!(handle.timeouts().first(), Duration::from_millis(100));
    }

    #[test]
    fn apply_routes_abort() {
        let handle = handle();
        let update = TimeoutUpdate {
            first_phase_duration_ms: 0,
            second_phase_duration_ms: 0,
            abort: true,
        };
        handle.apply(&update).unwrap();
        assert!(handle.is_aborted());
        assert!(handle.cancel_signal().is_cancelled());
    }

    #[test]
    fn apply_routes_timeouts() {
        let handle = handle();
        let update = TimeoutUpdate {
            first_phase_duration_ms: 30,
            second_phase_duration_ms: 40,
            abort: false,
        };
        handle.apply(&update).unwrap();
        assert!(!handle.is_aborted());
        assert_eq!(handle.timeouts().second(), Duration::from_millis(40));
    }

    #[test]
    fn apply_rejects_negative_durations() {
        let handle = handle();
        let update = TimeoutUpdate {
            first_phase_duration_ms: -5,
            second_phase_duration_ms: 40,
            abort: false,
        };
        assert!(matches!(
            handle.apply(&update),
            Err(TourForgeError::Config(_))
        ));
    }

    #[test]
    fn clones_share_state() {
        let handle = handle();
        let remote = handle.clone();
        handle.set_solving(true);
        assert!(remote.is_solving());
        remote.abort();
        assert!(handle.is_aborted());
    }
}
