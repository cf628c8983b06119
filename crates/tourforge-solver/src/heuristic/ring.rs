//! Arena-backed cyclic tour graph.
//!
//! Nodes live in one `Vec` and refer to each other by index, so copying a
//! ring is a plain clone. A freshly built ring is laid out in traversal
//! order: node `p` sits at tour position `p` and its successor is `p + 1`.

use tourforge_core::Point;

/// One node of a [`TourRing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingNode {
    pub value: Point,
    pub next: Option<usize>,
    pub prev: Option<usize>,
}

/// Which pair of new edges to add after removing three edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconnection {
    /// `a -> c`, `b -> e`, `d -> f`: both inner segments reversed.
    A,
    /// `a -> d`, `e -> c`, `b -> f`: segments swapped, the first reversed.
    B,
}

/// Three removed edges `(i, i+1)`, `(j, j+1)`, `(k, k+1)`, by node index.
///
/// Valid triples satisfy `i + 1 < j`, `j + 1 < k` and `k + 1 < n`, which
/// leaves every segment between removed edges at least two nodes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeTriple {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl EdgeTriple {
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }

    /// Every valid triple for a ring of `n` nodes, in lexicographic order.
    pub fn all(n: usize) -> impl Iterator<Item = EdgeTriple> {
        let last = n.saturating_sub(1);
        (0..last).flat_map(move |i| {
            (i + 2..last).flat_map(move |j| (j + 2..last).map(move |k| EdgeTriple { i, j, k }))
        })
    }

    pub fn is_valid(&self, n: usize) -> bool {
        self.i + 1 < self.j && self.j + 1 < self.k && self.k + 1 < n
    }
}

/// Cyclic tour stored as an arena of linked nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TourRing {
    nodes: Vec<RingNode>,
}

impl TourRing {
    /// Builds a ring visiting `points` in order.
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let nodes = points
            .iter()
            .enumerate()
            .map(|(p, &value)| RingNode {
                value,
                next: Some((p + 1) % n),
                prev: Some((p + n - 1) % n),
            })
            .collect();
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &RingNode {
        &self.nodes[index]
    }

    /// Walks the ring from node 0 and returns the visited values.
    ///
    /// Stops early on a missing link, so a broken ring yields fewer than
    /// `len()` points.
    pub fn to_points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.nodes.len());
        let mut current = 0;
        for _ in 0..self.nodes.len() {
            let node = &self.nodes[current];
            points.push(node.value);
            match node.next {
                Some(next) => current = next,
                None => break,
            }
        }
        points
    }

    /// Length of the cycle reached by walking from node 0.
    pub fn total_distance(&self) -> f64 {
        let mut total = 0.0;
        let mut current = 0;
        for _ in 0..self.nodes.len() {
            let node = &self.nodes[current];
            let Some(next) = node.next else {
                break;
            };
            total += node.value.distance(&self.nodes[next].value);
            current = next;
        }
        total
    }

    /// Removes the three edges of `triple` and adds the edges of `variation`,
    /// then repairs link directions.
    ///
    /// Node indices are used as tour positions, which holds for rings built
    /// by [`from_points`](Self::from_points).
    pub fn reconnect(&mut self, variation: Reconnection, triple: EdgeTriple) {
        debug_assert!(triple.is_valid(self.nodes.len()));
        let EdgeTriple { i, j, k } = triple;
        let (a, b, c, d, e, f) = (i, i + 1, j, j + 1, k, k + 1);

        for (from, to) in [(a, b), (c, d), (e, f)] {
            self.disconnect(from, to);
        }

        let added = match variation {
            Reconnection::A => [(a, c), (b, e), (d, f)],
            Reconnection::B => [(a, d), (e, c), (b, f)],
        };
        for (from, to) in added {
            self.connect(from, to);
        }

        self.repair();
    }

    fn disconnect(&mut self, from: usize, to: usize) {
        self.nodes[from].next = None;
        self.nodes[to].prev = None;
    }

    // Each endpoint has exactly one free slot after disconnect.
    fn connect(&mut self, from: usize, to: usize) {
        let from_node = &mut self.nodes[from];
        if from_node.next.is_none() {
            from_node.next = Some(to);
        } else {
            from_node.prev = Some(to);
        }

        let to_node = &mut self.nodes[to];
        if to_node.prev.is_none() {
            to_node.prev = Some(from);
        } else {
            to_node.next = Some(from);
        }
    }

    /// Restores a forward-readable cycle starting at node 0.
    ///
    /// After reconnection some segments are linked backwards. Walking from
    /// node 0, a node whose `next` is missing or points back to where the
    /// walk came from is flipped to use its old `prev` instead, and every
    /// `prev` is reset to the node actually visited before it.
    pub fn repair(&mut self) {
        let n = self.nodes.len();
        if n < 2 {
            return;
        }

        let start = 0;
        let mut previous = start;
        let Some(mut current) = self.nodes[start].next else {
            return;
        };

        for _ in 1..n {
            let node = &mut self.nodes[current];
            let old_prev = node.prev;
            match node.next {
                None => node.next = old_prev,
                Some(next) if next == previous => node.next = old_prev,
                Some(_) => {}
            }
            node.prev = Some(previous);

            previous = current;
            match node.next {
                Some(next) => current = next,
                None => break,
            }
        }

        self.nodes[start].prev = Some(previous);
    }

    /// True when the links form one cycle through every node and each
    /// `prev` mirrors a `next`.
    pub fn is_consistent(&self) -> bool {
        let n = self.nodes.len();
        let mut seen = vec![false; n];
        let mut current = 0;
        for _ in 0..n {
            if seen[current] {
                return false;
            }
            seen[current] = true;
            let Some(next) = self.nodes[current].next else {
                return false;
            };
            if self.nodes[next].prev != Some(current) {
                return false;
            }
            current = next;
        }
        n == 0 || (current == 0 && seen.iter().all(|&s| s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourforge_core::total_distance;

    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, (i % 2) as f64)).collect()
    }

    fn indices(ring: &TourRing, points: &[Point]) -> Vec<usize> {
        ring.to_points()
            .iter()
            .map(|p| points.iter().position(|q| q == p).unwrap())
            .collect()
    }

    #[test]
    fn fresh_ring_matches_input() {
        let points = line(7);
        let ring = TourRing::from_points(&points);
        assert!(ring.is_consistent());
        assert_eq!(ring.to_points(), points);
        assert!((ring.total_distance() - total_distance(&points)).abs() < 1e-12);
    }

    #[test]
    fn triples_respect_gaps() {
        let triples: Vec<_> = EdgeTriple::all(7).collect();
        assert_eq!(
            triples,
            vec![
                EdgeTriple::new(0, 2, 4),
                EdgeTriple::new(0, 2, 5),
                EdgeTriple::new(0, 3, 5),
                EdgeTriple::new(1, 3, 5),
            ]
        );
        assert!(triples.iter().all(|t| t.is_valid(7)));
        assert_eq!(EdgeTriple::all(5).count(), 0);
        assert_eq!(EdgeTriple::all(6).count(), 1);
    }

    #[test]
    fn variation_a_reverses_both_segments() {
        let points = line(8);
        let mut ring = TourRing::from_points(&points);
        ring.reconnect(Reconnection::A, EdgeTriple::new(0, 3, 6));

        assert!(ring.is_consistent());
        // a=0 -> c=3..b=1 -> e=6..d=4 -> f=7
        assert_eq!(indices(&ring, &points), vec![0, 3, 2, 1, 6, 5, 4, 7]);
    }

    #[test]
    fn variation_b_swaps_segments() {
        let points = line(8);
        let mut ring = TourRing::from_points(&points);
        ring.reconnect(Reconnection::B, EdgeTriple::new(0, 3, 6));

        assert!(ring.is_consistent());
        // a=0 -> d=4..e=6 -> c=3..b=1 -> f=7
        assert_eq!(indices(&ring, &points), vec![0, 4, 5, 6, 3, 2, 1, 7]);
    }

    #[test]
    fn every_triple_yields_a_hamiltonian_cycle() {
        let points = line(11);
        for triple in EdgeTriple::all(points.len()) {
            for variation in [Reconnection::A, Reconnection::B] {
                let mut ring = TourRing::from_points(&points);
                ring.reconnect(variation, triple);
                assert!(ring.is_consistent(), "{variation:?} {triple:?}");

                let mut visited = indices(&ring, &points);
                visited.sort_unstable();
                assert_eq!(visited, (0..points.len()).collect::<Vec<_>>());
                assert!(
                    (ring.total_distance() - total_distance(&ring.to_points())).abs() < 1e-9
                );
            }
        }
    }

    #[test]
    fn repair_points_unset_successor_back() {
        let points = line(3);
        let mut ring = TourRing::from_points(&points);
        // 0 -> 1 -> 2 with node 2 missing its successor.
        ring.nodes[2].next = None;
        ring.nodes[2].prev = Some(0);
        ring.repair();
        assert_eq!(ring.node(2).next, Some(0));
        assert_eq!(ring.node(2).prev, Some(1));
        assert_eq!(ring.node(0).prev, Some(2));
        assert!(ring.is_consistent());
    }

    #[test]
    fn clones_are_independent() {
        let points = line(8);
        let ring = TourRing::from_points(&points);
        let mut copy = ring.clone();
        copy.reconnect(Reconnection::A, EdgeTriple::new(0, 3, 6));
        assert_eq!(ring.to_points(), points);
        assert_ne!(copy.to_points(), points);
    }
}
