use crate::matrix::DistanceMatrix;

/// Dense per-directed-edge penalty counts for guided local search.
///
/// Row-major like [`DistanceMatrix`]. The cost model is symmetric, so
/// [`PenaltyMatrix::bump`] raises both directions of an edge together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PenaltyMatrix {
    n: usize,
    counts: Vec<u32>,
}

impl PenaltyMatrix {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            n,
            counts: vec![0; n * n],
        }
    }

    #[inline]
    pub(crate) fn get(&self, from: usize, to: usize) -> u32 {
        self.counts[from * self.n + to]
    }

    pub(crate) fn bump(&mut self, a: usize, b: usize) {
        let n = self.n;
        let ab = &mut self.counts[a * n + b];
        *ab = ab.saturating_add(1);
        let ba = &mut self.counts[b * n + a];
        *ba = ba.saturating_add(1);
    }

    pub(crate) fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum::<u64>() / 2
    }

    /// Penalizes the edges of the closed tour `order` whose utility
    /// `cost / (1 + penalty)` is maximal. Returns how many edges were bumped.
    pub(crate) fn penalize_max_utility(&mut self, matrix: &DistanceMatrix, order: &[usize]) -> usize {
        let n = order.len();
        if n < 2 {
            return 0;
        }

        let edges: Vec<(usize, usize)> = (0..n).map(|i| (order[i], order[(i + 1) % n])).collect();

        // utility as a fraction (cost, 1 + penalty), compared by cross-multiplying
        let mut best: Option<(i128, i128)> = None;
        for &(a, b) in &edges {
            let u = (
                i128::from(matrix.cost(a, b)),
                1 + i128::from(self.get(a, b)),
            );
            if best.is_none_or(|(num, den)| u.0 * den > num * u.1) {
                best = Some(u);
            }
        }
        let Some((num, den)) = best else {
            return 0;
        };

        let mut bumped = 0;
        for (a, b) in edges {
            let (c, p) = (
                i128::from(matrix.cost(a, b)),
                1 + i128::from(self.get(a, b)),
            );
            if c * den == num * p {
                self.bump(a, b);
                bumped += 1;
            }
        }
        bumped
    }
}

#[cfg(test)]
mod tests {
    use super::PenaltyMatrix;
    use crate::{matrix::DistanceMatrix, node::Point};

    #[test]
    fn bump_is_symmetric_and_saturating() {
        let mut p = PenaltyMatrix::new(3);
        p.bump(0, 2);
        assert_eq!(p.get(0, 2), 1);
        assert_eq!(p.get(2, 0), 1);
        assert_eq!(p.get(0, 1), 0);
        assert_eq!(p.total(), 1);

        p.counts[1] = u32::MAX;
        p.bump(0, 1);
        assert_eq!(p.get(0, 1), u32::MAX);
    }

    #[test]
    fn penalizes_longest_edge_first_then_spreads() {
        // line 0 - 1 - 2 with the return arc 2 -> 0 the longest edge
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(3.0, 0.0),
        ];
        let m = DistanceMatrix::from_points(&points);
        let mut p = PenaltyMatrix::new(3);

        assert_eq!(p.penalize_max_utility(&m, &[0, 1, 2]), 1);
        assert_eq!(p.get(2, 0), 1);

        // utilities are now 10/1, 20/1, 30/2, so 1 -> 2 is next
        assert_eq!(p.penalize_max_utility(&m, &[0, 1, 2]), 1);
        assert_eq!(p.get(1, 2), 1);
    }

    #[test]
    fn ties_bump_every_maximal_edge() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let m = DistanceMatrix::from_points(&points);
        let mut p = PenaltyMatrix::new(4);
        assert_eq!(p.penalize_max_utility(&m, &[0, 1, 2, 3]), 4);
        assert_eq!(p.total(), 4);
    }
}
