//! External cancellation of a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cancellation flag shared between the control surface and the orchestrator.
///
/// The flag can be polled from synchronous code with
/// [`is_cancelled`](Self::is_cancelled) or awaited from a barrier with
/// [`cancelled`](Self::cancelled). Cancellation is one-way: once set it
/// stays set.
///
/// # Example
///
/// ```
/// use tourforge_solver::CancelSignal;
///
/// let signal = CancelSignal::new();
/// let remote = signal.clone();
/// assert!(!signal.is_cancelled());
///
/// remote.cancel();
/// assert!(signal.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes every pending [`cancelled`](Self::cancelled) future.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once the signal has been cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel() is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn cancel_is_sticky() {
        let signal = CancelSignal::new();
        signal.cancel();
        signal.cancel();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn cancelled_future_wakes_on_cancel() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let signal = CancelSignal::new();
        let remote = signal.clone();

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        runtime.block_on(async {
            tokio::time::timeout(Duration::from_secs(5), signal.cancelled())
                .await
                .expect("cancel was not observed");
        });
        assert!(start.elapsed() < Duration::from_secs(5));
        canceller.join().unwrap();
    }

    #[test]
    fn cancelled_future_completes_immediately_when_already_set() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let signal = CancelSignal::new();
        signal.cancel();
        runtime.block_on(signal.cancelled());
    }
}
