//! Live-updatable phase timeouts.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Optimization stage within an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Phase 1: PMX recombination.
    Recombination,
    /// Phase 2: 3-opt local search.
    LocalSearch,
}

impl Phase {
    pub fn number(&self) -> u8 {
        match self {
            Phase::Recombination => 1,
            Phase::LocalSearch => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Recombination => "PMX Recombination",
            Phase::LocalSearch => "3-opt Local Search",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pair of phase timeouts shared between a run and its handle.
///
/// Each phase reads its timeout when it starts, so an update affects the
/// next phase and never one already waiting at its barrier.
#[derive(Debug, Clone)]
pub struct PhaseTimeouts {
    millis: Arc<[AtomicU64; 2]>,
}

impl PhaseTimeouts {
    pub fn new(first: Duration, second: Duration) -> Self {
        Self {
            millis: Arc::new([
                AtomicU64::new(duration_millis(first)),
                AtomicU64::new(duration_millis(second)),
            ]),
        }
    }

    pub fn from_millis(first_ms: u64, second_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(first_ms),
            Duration::from_millis(second_ms),
        )
    }

    pub fn update(&self, first_ms: u64, second_ms: u64) {
        self.millis[0].store(first_ms, Ordering::SeqCst);
        self.millis[1].store(second_ms, Ordering::SeqCst);
    }

    pub fn first(&self) -> Duration {
        Duration::from_millis(self.millis[0].load(Ordering::SeqCst))
    }

    pub fn second(&self) -> Duration {
        Duration::from_millis(self.millis[1].load(Ordering::SeqCst))
    }

    pub fn for_phase(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Recombination => self.first(),
            Phase::LocalSearch => self.second(),
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_see_updates() {
        let timeouts = PhaseTimeouts::from_millis(100, 200);
        let remote = timeouts.clone();
        remote.update(5, 6);
        assert_eq!(timeouts.first(), Duration::from_millis(5));
        assert_eq!(timeouts.for_phase(Phase::LocalSearch), Duration::from_millis(6));
    }

    #[test]
    fn phase_numbers() {
        assert_eq!(Phase::Recombination.number(), 1);
        assert_eq!(Phase::LocalSearch.number(), 2);
        assert_eq!(Phase::LocalSearch.to_string(), "3-opt Local Search");
    }
}
