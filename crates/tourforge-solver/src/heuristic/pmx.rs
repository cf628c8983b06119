//! Partially-mapped crossover (PMX).

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tourforge_core::{identity, to_points, total_distance_by_indices, Point};
use tracing::trace;

use super::{BestRecord, ScoredTour};
use crate::statistics::SolutionCounter;

/// Contiguous range of positions copied verbatim from one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverWindow {
    pub anchor: usize,
    pub length: usize,
}

impl CrossoverWindow {
    pub fn new(anchor: usize, length: usize) -> Self {
        Self { anchor, length }
    }

    /// Draws a window for tours of `n >= 2` positions.
    ///
    /// The length is uniform in `[1, n - 1)` (just `1` when `n = 2`) and the
    /// anchor uniform in `[0, n - length]`.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let length = rng.random_range(1..n.saturating_sub(1).max(2));
        let anchor = rng.random_range(0..=n.saturating_sub(length));
        Self { anchor, length }
    }

    /// One past the last copied position, clamped to `n`.
    fn end(&self, n: usize) -> usize {
        (self.anchor + self.length).min(n)
    }

    fn contains(&self, position: usize, n: usize) -> bool {
        position >= self.anchor && position < self.end(n)
    }
}

/// Builds one PMX child.
///
/// Positions inside `window` are copied from `window_parent`; every other
/// position takes the value `other_parent` holds there, following the
/// mapping chain whenever that value is already inside the window.
///
/// ```
/// use tourforge_solver::heuristic::{pmx_child, CrossoverWindow};
///
/// let first = [0, 1, 2, 3, 4, 5];
/// let second = [5, 3, 1, 0, 4, 2];
/// let child = pmx_child(&first, &second, CrossoverWindow::new(1, 3));
/// assert_eq!(&child[1..4], &[1, 2, 3]);
/// assert_eq!(child, vec![5, 1, 2, 3, 4, 0]);
/// ```
pub fn pmx_child(
    window_parent: &[usize],
    other_parent: &[usize],
    window: CrossoverWindow,
) -> Vec<usize> {
    let n = window_parent.len();
    debug_assert_eq!(n, other_parent.len());

    let mut position_of = vec![0usize; n];
    for (position, &value) in window_parent.iter().enumerate() {
        position_of[value] = position;
    }

    let mut in_window = vec![false; n];
    let mut child = vec![0usize; n];
    for position in window.anchor..window.end(n) {
        let value = window_parent[position];
        child[position] = value;
        in_window[value] = true;
    }

    for position in (0..n).filter(|&p| !window.contains(p, n)) {
        let mut value = other_parent[position];
        while in_window[value] {
            value = other_parent[position_of[value]];
        }
        child[position] = value;
    }

    child
}

/// Recombination operator state for one worker.
///
/// Holds two parent permutations over `points` and the best permutation seen
/// since creation. The best starts as the identity, i.e. the seed tour in
/// the order it was given.
#[derive(Debug)]
pub struct PmxCrossover {
    points: Vec<Point>,
    first_parent: Vec<usize>,
    second_parent: Vec<usize>,
    best: Vec<usize>,
    best_distance: f64,
    record: BestRecord<ScoredTour>,
    counter: SolutionCounter,
    rng: ChaCha8Rng,
}

impl PmxCrossover {
    /// Creates an operator with two random parent permutations.
    pub fn new(points: Vec<Point>, counter: SolutionCounter, mut rng: ChaCha8Rng) -> Self {
        let n = points.len();
        let mut first = identity(n);
        let mut second = identity(n);
        first.shuffle(&mut rng);
        second.shuffle(&mut rng);
        Self::with_parents(points, first, second, counter, rng)
    }

    /// Creates an operator with explicit parents.
    pub fn with_parents(
        points: Vec<Point>,
        first_parent: Vec<usize>,
        second_parent: Vec<usize>,
        counter: SolutionCounter,
        rng: ChaCha8Rng,
    ) -> Self {
        let best = identity(points.len());
        let best_distance = total_distance_by_indices(&points, &best);
        let record = BestRecord::new(ScoredTour {
            points: points.clone(),
            distance: best_distance,
        });
        Self {
            points,
            first_parent,
            second_parent,
            best,
            best_distance,
            record,
            counter,
            rng,
        }
    }

    /// Runs one generation with a randomly drawn window.
    pub fn next_generation(&mut self) {
        let n = self.points.len();
        if n < 2 {
            self.counter.increment();
            return;
        }
        let window = CrossoverWindow::random(n, &mut self.rng);
        self.next_generation_with_window(window);
    }

    /// Runs one generation with the given window.
    ///
    /// Both children are compared against the best distance as it was before
    /// this call, so when both beat it the second child wins even if the
    /// first one is shorter.
    pub fn next_generation_with_window(&mut self, window: CrossoverWindow) {
        let child_a = pmx_child(&self.first_parent, &self.second_parent, window);
        let child_b = pmx_child(&self.second_parent, &self.first_parent, window);

        let old_best_distance = self.best_distance;
        let distance_a = total_distance_by_indices(&self.points, &child_a);
        let distance_b = total_distance_by_indices(&self.points, &child_b);

        trace!(
            event = "pmx_generation",
            anchor = window.anchor,
            length = window.length,
            child_a = distance_a,
            child_b = distance_b,
            best = old_best_distance,
        );

        if distance_a < old_best_distance {
            self.adopt(child_a.clone(), distance_a);
        }
        if distance_b < old_best_distance {
            self.adopt(child_b.clone(), distance_b);
        }

        self.first_parent = child_a;
        self.second_parent = child_b;
        self.counter.increment();
    }

    fn adopt(&mut self, order: Vec<usize>, distance: f64) {
        self.record.set(ScoredTour {
            points: to_points(&self.points, &order),
            distance,
        });
        self.best = order;
        self.best_distance = distance;
    }

    /// The best tour found so far, as points.
    pub fn best_generation(&self) -> Vec<Point> {
        to_points(&self.points, &self.best)
    }

    pub fn best_indices(&self) -> &[usize] {
        &self.best
    }

    pub fn best_distance(&self) -> f64 {
        self.best_distance
    }

    pub fn parents(&self) -> (&[usize], &[usize]) {
        (&self.first_parent, &self.second_parent)
    }

    /// Handle the orchestrator reads after the phase barrier.
    pub fn best_record(&self) -> BestRecord<ScoredTour> {
        self.record.clone()
    }
}
