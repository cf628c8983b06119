//! Shared test fixtures for TourForge crates.
//!
//! This crate provides point sets with known properties. It depends only on
//! `tourforge-core`, so every other crate can use it as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tourforge-test = { workspace = true }
//! ```
//!
//! ```
//! use tourforge_core::total_distance;
//! use tourforge_test::{hexagon, square};
//!
//! assert_eq!(total_distance(&square()), 4.0);
//! assert_eq!(hexagon().len(), 6);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tourforge_core::Point;

/// Unit square in optimal cyclic order.
pub fn square() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ]
}

/// Unit square visited along both diagonals.
pub fn scrambled_square() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
    ]
}

/// Regular hexagon of radius 1 in optimal cyclic order.
pub fn hexagon() -> Vec<Point> {
    (0..6)
        .map(|i| {
            let angle = std::f64::consts::PI / 3.0 * i as f64;
            Point::new(angle.cos(), angle.sin())
        })
        .collect()
}

/// `n` points drawn uniformly from `[0, 100)²`, reproducible per `seed`.
pub fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
        .collect()
}

/// A reproducible permutation of `points`.
pub fn shuffled(points: &[Point], seed: u64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = points.to_vec();
    out.shuffle(&mut rng);
    out
}

/// Returns true when `a` and `b` hold the same points, in any order.
pub fn same_points(a: &[Point], b: &[Point]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|p| {
        match (0..b.len()).find(|&i| !used[i] && b[i] == *p) {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourforge_core::total_distance;

    #[test]
    fn test_fixtures_are_reproducible() {
        assert_eq!(random_points(8, 42), random_points(8, 42));
        assert_ne!(random_points(8, 42), random_points(8, 43));
        assert_eq!(shuffled(&hexagon(), 1), shuffled(&hexagon(), 1));
    }

    #[test]
    fn test_scrambled_square_is_longer() {
        assert!(total_distance(&scrambled_square()) > total_distance(&square()));
        assert!(same_points(&scrambled_square(), &square()));
    }

    #[test]
    fn test_hexagon_perimeter() {
        assert!((total_distance(&hexagon()) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_points_respects_multiplicity() {
        let a = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)];
        let b = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert!(!same_points(&a, &b));
        assert!(same_points(&shuffled(&square(), 9), &square()));
    }
}
