use std::fmt;

use crate::{Error, Point, Result};

/// Open-path length of `order`: consecutive Euclidean distances, no wraparound.
pub fn path_length(points: &[Point], order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|w| points[w[0]].dist(&points[w[1]]))
        .sum()
}

/// Checks that `order` is a permutation of `0..n` that starts at the depot.
pub fn validate_order(order: &[usize], n: usize) -> Result<()> {
    if order.len() != n {
        return Err(Error::invalid_data(format!(
            "order has {} entries, expected {n}",
            order.len()
        )));
    }
    if let Some(&first) = order.first()
        && first != crate::DEPOT
    {
        return Err(Error::invalid_data(format!(
            "order starts at {first}, expected depot {}",
            crate::DEPOT
        )));
    }

    let mut seen = vec![false; n];
    for &idx in order {
        if idx >= n {
            return Err(Error::invalid_data(format!("index {idx} out of range for n={n}")));
        }
        if seen[idx] {
            return Err(Error::invalid_data(format!("index {idx} appears twice")));
        }
        seen[idx] = true;
    }
    Ok(())
}

/// Before/after lengths for one point set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathReport {
    pub unoptimized_distance: f64,
    pub optimized_distance: f64,
}

impl PathReport {
    /// Compares the input order (identity) against `order`.
    pub fn measure(points: &[Point], order: &[usize]) -> Self {
        let identity: Vec<usize> = (0..points.len()).collect();
        Self {
            unoptimized_distance: path_length(points, &identity),
            optimized_distance: path_length(points, order),
        }
    }

    /// `unoptimized / optimized`, undefined when the optimized path has no length.
    pub fn speedup(&self) -> Option<f64> {
        (self.optimized_distance > 0.0)
            .then(|| self.unoptimized_distance / self.optimized_distance)
    }
}

impl fmt::Display for PathReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unoptimized_distance={:.2} optimized_distance={:.2} speedup=",
            self.unoptimized_distance, self.optimized_distance
        )?;
        match self.speedup() {
            Some(s) => write!(f, "{s:.2}x"),
            None => f.write_str("n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PathReport, path_length, validate_order};
    use crate::Point;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn path_length_is_open() {
        assert_eq!(path_length(&square(), &[0, 1, 2, 3]), 30.0);
        let crossing = path_length(&square(), &[0, 2, 1, 3]);
        assert!((crossing - (10.0 + 2.0 * 200f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn two_points_give_their_euclidean_distance() {
        let points = [Point::new(1.0, 2.0), Point::new(4.0, 6.0)];
        assert_eq!(path_length(&points, &[0, 1]), 5.0);
    }

    #[test]
    fn trivial_paths_have_zero_length() {
        assert_eq!(path_length(&[], &[]), 0.0);
        assert_eq!(path_length(&[Point::new(3.0, 3.0)], &[0]), 0.0);
    }

    #[test]
    fn validate_order_accepts_permutations_from_depot() {
        assert!(validate_order(&[], 0).is_ok());
        assert!(validate_order(&[0], 1).is_ok());
        assert!(validate_order(&[0, 3, 1, 2], 4).is_ok());
    }

    #[test]
    fn validate_order_rejects_broken_tours() {
        let cases: [(&[usize], usize, &str); 4] = [
            (&[0, 1], 3, "expected 3"),
            (&[1, 0, 2], 3, "expected depot"),
            (&[0, 1, 1], 3, "appears twice"),
            (&[0, 1, 5], 3, "out of range"),
        ];
        for (order, n, needle) in cases {
            let err = validate_order(order, n).expect_err("invalid order");
            assert!(err.to_string().contains(needle), "{err}");
        }
    }

    #[test]
    fn report_formats_two_decimals_and_speedup() {
        let report = PathReport::measure(&square(), &[0, 1, 2, 3]);
        assert_eq!(report.to_string(), "unoptimized_distance=30.00 optimized_distance=30.00 speedup=1.00x");

        let report = PathReport {
            unoptimized_distance: 48.284,
            optimized_distance: 30.0,
        };
        assert!((report.speedup().expect("defined") - 1.6094).abs() < 1e-3);
    }

    #[test]
    fn speedup_is_undefined_for_zero_length_paths() {
        let report = PathReport::measure(&[Point::new(1.0, 1.0)], &[0]);
        assert_eq!(report.speedup(), None);
        assert!(report.to_string().ends_with("speedup=n/a"));
    }
}
