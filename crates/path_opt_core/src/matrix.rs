//! Integer travel costs between every pair of points.
//!
//! Costs are `trunc(COST_SCALE * euclid(i, j))`. Integer sums compare exactly, so
//! the search sees the same ordering of candidate moves on every run.

use crate::node::Point;

pub const COST_SCALE: f64 = 10.0;

/// Dense row-major cost table. Symmetric with a zero diagonal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMatrix {
    n: usize,
    costs: Vec<i64>,
}

impl DistanceMatrix {
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut costs = vec![0_i64; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let cost = scaled_cost(points[i], points[j]);
                costs[i * n + j] = cost;
                costs[j * n + i] = cost;
            }
        }
        Self { n, costs }
    }

    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> i64 {
        debug_assert!(
            from < self.n && to < self.n,
            "called `DistanceMatrix::cost` out of bounds: n={} from={from} to={to}",
            self.n
        );
        self.costs[from * self.n + to]
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn max_cost(&self) -> i64 {
        self.costs.iter().copied().max().unwrap_or(0)
    }

    /// Whether every tour cost and move delta over this matrix fits in `i64`.
    /// Coordinates far enough apart saturate [`scaled_cost`] and fail this check.
    pub fn cost_sums_fit(&self) -> bool {
        i64::try_from(self.n)
            .ok()
            .and_then(|n| n.checked_add(4))
            .and_then(|terms| self.max_cost().checked_mul(terms))
            .is_some()
    }

    /// Cost of visiting `order` and returning to its first node.
    pub fn cycle_cost(&self, order: &[usize]) -> i64 {
        match order {
            [] | [_] => 0,
            [first, .., last] => {
                let open: i64 = order.windows(2).map(|w| self.cost(w[0], w[1])).sum();
                open + self.cost(*last, *first)
            }
        }
    }
}

#[inline]
fn scaled_cost(a: Point, b: Point) -> i64 {
    // `as` truncates toward zero and saturates on overflow.
    (COST_SCALE * a.dist(&b)) as i64
}
