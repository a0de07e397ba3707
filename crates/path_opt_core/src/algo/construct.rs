use std::time::Instant;

use crate::matrix::DistanceMatrix;

/// Result of the greedy path construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Construction {
    pub order: Vec<usize>,
    /// `false` when the deadline cut the greedy extension short and the
    /// remaining nodes were appended in index order.
    pub complete: bool,
}

/// Cheapest-arc path construction from `depot`.
///
/// The path is extended with the unvisited node closest to its current end,
/// lowest index first on ties. O(n^2).
pub fn cheapest_arc_path(
    matrix: &DistanceMatrix,
    depot: usize,
    deadline: Option<Instant>,
) -> Construction {
    let n = matrix.len();
    if n == 0 {
        return Construction {
            order: Vec::new(),
            complete: true,
        };
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    visited[depot] = true;
    order.push(depot);

    let mut end = depot;
    while order.len() < n {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            let placed = order.len();
            order.extend((0..n).filter(|&node| !visited[node]));
            log::warn!(
                "construct: deadline hit n={n} placed={placed}, appending the rest in index order"
            );
            return Construction {
                order,
                complete: false,
            };
        }

        let mut best: Option<(i64, usize)> = None;
        for node in 0..n {
            if visited[node] {
                continue;
            }
            let cost = matrix.cost(end, node);
            // strict `<` keeps the lowest index on ties
            if best.is_none_or(|(best_cost, _)| cost < best_cost) {
                best = Some((cost, node));
            }
        }

        let Some((_, next)) = best else {
            break;
        };
        visited[next] = true;
        order.push(next);
        end = next;
    }

    Construction {
        order,
        complete: true,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::cheapest_arc_path;
    use crate::{matrix::DistanceMatrix, node::Point};

    fn matrix(coords: &[(f64, f64)]) -> DistanceMatrix {
        let points: Vec<Point> = coords.iter().copied().map(Point::from).collect();
        DistanceMatrix::from_points(&points)
    }

    #[test]
    fn follows_nearest_unvisited_node() {
        let m = matrix(&[(0.0, 0.0), (5.0, 0.0), (1.0, 0.0), (3.0, 0.0)]);
        let c = cheapest_arc_path(&m, 0, None);
        assert_eq!(c.order, vec![0, 2, 3, 1]);
        assert!(c.complete);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        // (10,0) and (0,10) are both 100 away from the depot
        let m = matrix(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let c = cheapest_arc_path(&m, 0, None);
        assert_eq!(c.order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn trivial_inputs() {
        assert!(cheapest_arc_path(&matrix(&[]), 0, None).order.is_empty());
        assert_eq!(
            cheapest_arc_path(&matrix(&[(4.0, 2.0)]), 0, None).order,
            vec![0]
        );
    }

    #[test]
    fn elapsed_deadline_still_yields_a_permutation() {
        let m = matrix(&[(0.0, 0.0), (9.0, 0.0), (1.0, 0.0), (5.0, 0.0), (2.0, 0.0)]);
        let past = Instant::now()
            .checked_sub(Duration::from_millis(1))
            .unwrap_or_else(Instant::now);
        let c = cheapest_arc_path(&m, 0, Some(past));
        assert!(!c.complete);
        assert_eq!(c.order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn output_is_a_permutation_starting_at_depot() {
        let coords: Vec<(f64, f64)> = (0..40)
            .map(|i| (((i * 37) % 101) as f64, ((i * 53) % 89) as f64))
            .collect();
        let c = cheapest_arc_path(&matrix(&coords), 0, None);
        assert_eq!(c.order[0], 0);
        let mut sorted = c.order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..40).collect::<Vec<_>>());
    }
}
