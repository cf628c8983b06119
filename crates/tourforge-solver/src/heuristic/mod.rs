//! Tour improvement heuristics.
//!
//! - [`PmxCrossover`]: partially-mapped crossover over index permutations
//! - [`ThreeOptSearch`]: exhaustive three-edge exchange over a [`TourRing`]
//!
//! Both operators publish every improvement to a [`BestRecord`] as soon as
//! it is found, so the orchestrator can read a usable result from a worker
//! that is still running when its phase times out.

mod pmx;
mod ring;
mod three_opt;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tourforge_core::{total_distance, Point};

pub use pmx::{pmx_child, CrossoverWindow, PmxCrossover};
pub use ring::{EdgeTriple, Reconnection, RingNode, TourRing};
pub use three_opt::{ThreeOptSearch, MIN_THREE_OPT_POINTS};

/// A tour together with its cyclic length.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTour {
    pub points: Vec<Point>,
    pub distance: f64,
}

impl ScoredTour {
    /// Scores `points` as a closed cycle.
    pub fn new(points: Vec<Point>) -> Self {
        let distance = total_distance(&points);
        Self { points, distance }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Shared, incrementally updated best value of one operator.
///
/// The operator writes; the orchestrator reads after the phase barrier.
/// Clones refer to the same slot.
#[derive(Debug)]
pub struct BestRecord<T> {
    slot: Arc<Mutex<T>>,
}

impl<T> Clone for BestRecord<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone> BestRecord<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(value)),
        }
    }

    /// Returns a snapshot of the current value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.lock() = value;
    }

    // A worker that panicked mid-update leaves the last complete value behind.
    fn lock(&self) -> MutexGuard<'_, T> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
