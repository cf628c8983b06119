//! Run statistics shared between the orchestrator and its workers.
//!
//! The [`SolutionCounter`] is the only state every worker mutates
//! concurrently. [`PhaseRecord`] entries are written by the orchestrator
//! after each barrier returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::mechanism::BarrierOutcome;

/// Atomic count of evaluated solutions.
///
/// Cloning yields another handle to the same count. Recombination workers
/// add one per generation and local search workers one per edge triple.
///
/// # Example
///
/// ```
/// use tourforge_solver::SolutionCounter;
///
/// let counter = SolutionCounter::new(10);
/// let worker_view = counter.clone();
/// worker_view.increment();
/// assert_eq!(counter.get(), 11);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SolutionCounter {
    count: Arc<AtomicU64>,
}

impl SolutionCounter {
    /// Creates a counter starting at `start` (solutions counted by earlier runs).
    pub fn new(start: u64) -> Self {
        Self {
            count: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Adds one and returns the new value.
    #[inline]
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the current value.
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Summary of one finished phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRecord {
    pub epoch: u64,
    /// Phase number, 1 (recombination) or 2 (local search).
    pub phase: u8,
    pub duration: Duration,
    pub outcome: BarrierOutcome,
    /// Workers whose result was collected.
    pub contributors: usize,
    pub failures: usize,
    /// Shortest tour produced by the phase, if any worker contributed.
    pub best_distance: Option<f64>,
    /// Solution counter value after the phase.
    pub solutions: u64,
}

impl PhaseRecord {
    pub fn timed_out(&self) -> bool {
        self.outcome == BarrierOutcome::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn counter_starts_at_offset() {
        let counter = SolutionCounter::new(1_200);
        assert_eq!(counter.get(), 1_200);
        assert_eq!(counter.increment(), 1_201);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let counter = SolutionCounter::default();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        counter.increment();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(counter.get(), 8_000);
    }
}
