//! Cyclic tour utilities.
//!
//! A tour is an ordering of points describing a closed cycle: the last entry
//! connects back to the first. Tours are represented either directly as a
//! point sequence or as a permutation of indices into a point slice.

use crate::Point;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    a.distance(b)
}

/// Total length of the closed cycle through `points`, in order.
///
/// Includes the wrap-around edge from the last point back to the first.
/// Tours with fewer than two points have length zero.
///
/// ```
/// use tourforge_core::{total_distance, Point};
///
/// let square = [
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
/// ];
/// assert_eq!(total_distance(&square), 4.0);
/// ```
pub fn total_distance(points: &[Point]) -> f64 {
    let Some(last) = points.last() else {
        return 0.0;
    };
    let open: f64 = points.windows(2).map(|w| w[0].distance(&w[1])).sum();
    open + last.distance(&points[0])
}

/// Total length of the closed cycle visiting `points` in the order `order`.
pub fn total_distance_by_indices(points: &[Point], order: &[usize]) -> f64 {
    let Some(&last) = order.last() else {
        return 0.0;
    };
    let open: f64 = order
        .windows(2)
        .map(|w| points[w[0]].distance(&points[w[1]]))
        .sum();
    open + points[last].distance(&points[order[0]])
}

/// The identity permutation `0..n`.
pub fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Returns true when `order` contains every index in `0..n` exactly once.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &idx in order {
        if idx >= n || seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    true
}

/// Rotates a tour left by `k` positions (same cycle, different start).
pub fn rotate<T: Clone>(tour: &[T], k: usize) -> Vec<T> {
    if tour.is_empty() {
        return Vec::new();
    }
    let k = k % tour.len();
    let mut rotated = Vec::with_capacity(tour.len());
    rotated.extend_from_slice(&tour[k..]);
    rotated.extend_from_slice(&tour[..k]);
    rotated
}

/// Maps an index permutation back to coordinates.
pub fn to_points(points: &[Point], order: &[usize]) -> Vec<Point> {
    order.iter().map(|&idx| points[idx]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_single_point_tours_have_zero_length() {
        assert_eq!(total_distance(&[]), 0.0);
        assert_eq!(total_distance(&[Point::new(3.0, 4.0)]), 0.0);
        assert_eq!(total_distance_by_indices(&[Point::new(1.0, 1.0)], &[]), 0.0);
    }

    #[test]
    fn two_point_tour_counts_both_directions() {
        let points = [Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        assert_eq!(total_distance(&points), 10.0);
    }

    #[test]
    fn reordering_changes_length() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let crossed = [square[0], square[2], square[1], square[3]];
        assert!(total_distance(&crossed) > total_distance(&square));
    }

    #[test]
    fn permutation_checks() {
        assert!(is_permutation(&identity(5), 5));
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
        assert!(!is_permutation(&[0, 1], 3));
    }

    #[test]
    fn rotate_wraps_offset() {
        assert_eq!(rotate(&[1, 2, 3, 4], 1), vec![2, 3, 4, 1]);
        assert_eq!(rotate(&[1, 2, 3, 4], 6), vec![3, 4, 1, 2]);
        assert!(rotate::<u8>(&[], 3).is_empty());
    }
}
