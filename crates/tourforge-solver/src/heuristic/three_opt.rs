//! Exhaustive three-edge exchange (3-opt).

use tourforge_core::{total_distance, Point};
use tracing::trace;

use super::{BestRecord, EdgeTriple, Reconnection, ScoredTour, TourRing};
use crate::statistics::SolutionCounter;

/// Smallest tour with three disjoint, non-adjacent edges.
pub const MIN_THREE_OPT_POINTS: usize = 6;

/// One local search pass over a single tour.
///
/// Every valid [`EdgeTriple`] is tried with both [`Reconnection`]s. A
/// candidate strictly shorter than the running best is adopted at once and
/// the remaining triples are evaluated against it.
///
/// # Example
///
/// ```
/// use tourforge_core::{total_distance, Point};
/// use tourforge_solver::{SolutionCounter, ThreeOptSearch};
///
/// // A 2x1 rectangle walked back and forth along both long sides.
/// let tour = vec![
///     Point::new(0.0, 0.0),
///     Point::new(2.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(2.0, 1.0),
///     Point::new(0.0, 1.0),
/// ];
/// let mut search = ThreeOptSearch::new(tour.clone(), SolutionCounter::default());
/// let improved = search.find();
/// assert_eq!(total_distance(&tour), 8.0);
/// assert_eq!(total_distance(&improved), 6.0);
/// ```
#[derive(Debug)]
pub struct ThreeOptSearch {
    input: Vec<Point>,
    best: Vec<Point>,
    best_distance: f64,
    record: BestRecord<ScoredTour>,
    counter: SolutionCounter,
}

impl ThreeOptSearch {
    pub fn new(points: Vec<Point>, counter: SolutionCounter) -> Self {
        let best_distance = total_distance(&points);
        let record = BestRecord::new(ScoredTour {
            points: points.clone(),
            distance: best_distance,
        });
        Self {
            best: points.clone(),
            input: points,
            best_distance,
            record,
            counter,
        }
    }

    /// Runs the full search and returns the best tour.
    ///
    /// Tours shorter than [`MIN_THREE_OPT_POINTS`] are returned unchanged.
    pub fn find(&mut self) -> Vec<Point> {
        let n = self.input.len();
        if n < MIN_THREE_OPT_POINTS {
            return self.input.clone();
        }

        let mut ring = TourRing::from_points(&self.best);
        for triple in EdgeTriple::all(n) {
            // Both reconnections cut the same three edges of the current cycle.
            let candidates = [Reconnection::A, Reconnection::B].map(|variation| {
                let mut candidate = ring.clone();
                candidate.reconnect(variation, triple);
                (variation, candidate)
            });

            let mut improved = false;
            for (variation, candidate) in candidates {
                let distance = candidate.total_distance();
                if distance < self.best_distance {
                    trace!(
                        event = "three_opt_improved",
                        i = triple.i,
                        j = triple.j,
                        k = triple.k,
                        variation = ?variation,
                        distance = distance
                    );
                    self.adopt(candidate.to_points(), distance);
                    improved = true;
                }
            }

            if improved {
                ring = TourRing::from_points(&self.best);
            }
            self.counter.increment();
        }

        self.best.clone()
    }

    fn adopt(&mut self, points: Vec<Point>, distance: f64) {
        self.record.set(ScoredTour {
            points: points.clone(),
            distance,
        });
        self.best = points;
        self.best_distance = distance;
    }

    /// The best tour found so far.
    pub fn best(&self) -> Vec<Point> {
        self.best.clone()
    }

    pub fn best_distance(&self) -> f64 {
        self.best_distance
    }

    pub fn best_record(&self) -> BestRecord<ScoredTour> {
        self.record.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourforge_test::{hexagon, random_points, scrambled_square, shuffled};

    fn same_cycle_set(a: &[Point], b: &[Point]) -> bool {
        a.len() == b.len() && a.iter().all(|p| b.contains(p))
    }

    #[test]
    fn short_tours_are_returned_unchanged() {
        let tour = scrambled_square();
        let counter = SolutionCounter::default();
        let mut search = ThreeOptSearch::new(tour.clone(), counter.clone());
        assert_eq!(search.find(), tour);
        assert_eq!(counter.get(), 0);

        for n in 0..MIN_THREE_OPT_POINTS {
            let tour = random_points(n, n as u64);
            let mut search = ThreeOptSearch::new(tour.clone(), SolutionCounter::default());
            assert_eq!(search.find(), tour);
        }
    }

    #[test]
    fn optimal_hexagon_keeps_its_length() {
        let tour = hexagon();
        let before = total_distance(&tour);
        let mut search = ThreeOptSearch::new(tour.clone(), SolutionCounter::default());
        let result = search.find();

        assert!(same_cycle_set(&result, &tour));
        assert!((total_distance(&result) - before).abs() < 1e-9);
    }

    #[test]
    fn never_worse_than_input() {
        for seed in 0..10 {
            let tour = random_points(6 + seed as usize, seed);
            let before = total_distance(&tour);
            let mut search = ThreeOptSearch::new(tour.clone(), SolutionCounter::default());
            let result = search.find();

            assert!(total_distance(&result) <= before + 1e-9);
            assert!(same_cycle_set(&result, &tour));
            assert!((search.best_distance() - total_distance(&result)).abs() < 1e-9);
        }
    }

    #[test]
    fn improves_a_scrambled_tour() {
        let tour = shuffled(&hexagon(), 3);
        let mut search = ThreeOptSearch::new(tour.clone(), SolutionCounter::default());
        let result = search.find();
        assert!(total_distance(&result) <= total_distance(&tour));
        assert_eq!(search.best_record().get().points, result);
    }

    #[test]
    fn counter_increments_once_per_triple() {
        let counter = SolutionCounter::new(5);
        let tour = random_points(9, 21);
        let mut search = ThreeOptSearch::new(tour, counter.clone());
        search.find();
        assert_eq!(counter.get(), 5 + EdgeTriple::all(9).count() as u64);
    }

    #[test]
    fn record_tracks_adoptions() {
        let tour = random_points(12, 8);
        let mut search = ThreeOptSearch::new(tour.clone(), SolutionCounter::default());
        let record = search.best_record();
        assert_eq!(record.get().points, tour);

        let result = search.find();
        let snapshot = record.get();
        assert_eq!(snapshot.points, result);
        assert!((snapshot.distance - total_distance(&result)).abs() < 1e-9);
    }

    #[test]
    fn both_variations_reconnect_the_same_cycle() {
        // Six points admit the single triple (0, 2, 4).
        assert_eq!(EdgeTriple::all(6).count(), 1);
        let triple = EdgeTriple::new(0, 2, 4);

        for seed in 0..200 {
            let tour = random_points(6, seed);
            let ring = TourRing::from_points(&tour);

            let mut expected = tour.clone();
            let mut expected_distance = total_distance(&tour);
            for variation in [Reconnection::A, Reconnection::B] {
                let mut candidate = ring.clone();
                candidate.reconnect(variation, triple);
                let distance = candidate.total_distance();
                if distance < expected_distance {
                    expected = candidate.to_points();
                    expected_distance = distance;
                }
            }

            let mut search = ThreeOptSearch::new(tour, SolutionCounter::default());
            assert_eq!(search.find(), expected, "seed {seed}");
        }
    }
}
