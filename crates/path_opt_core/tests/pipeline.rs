use std::time::{Duration, Instant};

use path_opt_core::{
    DistanceMatrix, GroupOutcome, LocalSearch, PathReport, Phase, Point, PointGroup,
    SearchParams, SolverOptions, StopReason, cheapest_arc_path, optimize_order, path_length,
    solve_groups, validate_order,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_points(seed: u64, n: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
        .collect()
}

fn params(time_limit: Duration, max_iterations: usize) -> SearchParams {
    SearchParams {
        time_limit,
        max_iterations,
        ..SearchParams::default()
    }
}

#[test]
fn crossed_square_is_uncrossed() {
    let points = vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 10.0),
    ];
    let outcome = optimize_order(&points, &params(Duration::from_secs(1), 20)).expect("solve");

    assert_eq!(outcome.order[0], 0);
    assert_eq!(outcome.cost, 400);
    let report = PathReport::measure(&points, &outcome.order);
    assert!((report.optimized_distance - 30.0).abs() < 1e-9);
    assert!((report.unoptimized_distance - (2.0 * 200f64.sqrt() + 10.0)).abs() < 1e-9);
    assert!(report.speedup().expect("defined") > 1.0);
}

#[test]
fn random_instance_respects_the_deadline_and_improves() {
    let points = random_points(7, 50);
    let limit = Duration::from_secs(1);

    let started = Instant::now();
    let outcome = optimize_order(&points, &params(limit, 0)).expect("solve");
    let elapsed = started.elapsed();

    assert_eq!(outcome.stop, StopReason::Deadline);
    assert!(elapsed < limit + Duration::from_millis(500), "{elapsed:?}");
    validate_order(&outcome.order, points.len()).expect("valid permutation");
    assert!(outcome.cost <= outcome.initial_cost);

    let matrix = DistanceMatrix::from_points(&points);
    assert_eq!(matrix.cycle_cost(&outcome.order), outcome.cost);
    let constructed = cheapest_arc_path(&matrix, 0, None);
    assert!(outcome.cost <= matrix.cycle_cost(&constructed.order));
}

#[test]
fn iteration_capped_runs_are_deterministic() {
    let points = random_points(42, 60);
    let p = params(Duration::from_secs(30), 200);

    let first = optimize_order(&points, &p).expect("first run");
    let second = optimize_order(&points, &p).expect("second run");

    assert_eq!(first.stop, StopReason::IterationCap);
    assert_eq!(first.passes, 200);
    assert_eq!(first.order, second.order);
    assert_eq!(first.cost, second.cost);
}

#[test]
fn search_from_a_given_order_never_gets_worse() {
    let points = random_points(3, 30);
    let matrix = DistanceMatrix::from_points(&points);
    let identity: Vec<usize> = (0..points.len()).collect();
    let identity_cost = matrix.cycle_cost(&identity);

    let mut search = LocalSearch::new(&matrix, params(Duration::from_secs(5), 100))
        .with_initial_order(identity);
    let outcome = search.run().expect("search");

    assert_eq!(search.phase(), Phase::Done);
    assert_eq!(outcome.initial_cost, identity_cost);
    assert!(outcome.cost < identity_cost);
}

#[test]
fn degenerate_sizes() {
    let p = params(Duration::from_secs(1), 0);

    let empty = optimize_order(&[], &p).expect("empty");
    assert!(empty.order.is_empty());
    assert_eq!(path_length(&[], &empty.order), 0.0);

    let single = optimize_order(&[Point::new(5.0, 5.0)], &p).expect("single");
    assert_eq!(single.order, vec![0]);
    assert_eq!(single.stop, StopReason::NoMoves);

    let pair = [Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
    let two = optimize_order(&pair, &p).expect("pair");
    assert_eq!(two.order, vec![0, 1]);
    assert_eq!(path_length(&pair, &two.order), 5.0);
}

#[test]
fn coincident_points_have_undefined_speedup() {
    let points = vec![Point::new(2.0, 2.0); 6];
    let outcome = optimize_order(&points, &params(Duration::from_millis(200), 10)).expect("solve");
    validate_order(&outcome.order, 6).expect("valid permutation");
    let report = PathReport::measure(&points, &outcome.order);
    assert_eq!(report.speedup(), None);
}

#[test]
fn groups_fail_independently_and_keep_input_order() {
    let mut groups: Vec<PointGroup> = (0..4)
        .map(|i| {
            PointGroup::new(format!("side{i}")).with_points(random_points(100 + i as u64, 20))
        })
        .collect();
    groups[2].points[5] = Point::new(f64::INFINITY, 0.0);

    let options = SolverOptions {
        time_limit: 1.0,
        max_iterations: 100,
        threads: 4,
        ..SolverOptions::default()
    };
    let reports = solve_groups(&groups, &options).expect("runner");

    assert_eq!(reports.len(), 4);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.name, format!("side{i}"));
        match (&report.outcome, i) {
            (GroupOutcome::NoSolution(msg), 2) => assert!(msg.contains("non-finite")),
            (GroupOutcome::Solved { order, report, .. }, _) => {
                validate_order(order, 20).expect("valid permutation");
                assert!(report.optimized_distance > 0.0);
            }
            (outcome, _) => panic!("unexpected outcome for group {i}: {outcome:?}"),
        }
    }
}

#[test]
fn overflowing_group_fails_alone() {
    let huge = PointGroup::new("huge".to_string()).with_points(vec![
        Point::new(0.0, 0.0),
        Point::new(1e18, 0.0),
        Point::new(1e18, 1e18),
        Point::new(0.0, 1e18),
    ]);
    let normal = PointGroup::new("normal".to_string()).with_points(random_points(9, 15));

    let options = SolverOptions {
        time_limit: 1.0,
        max_iterations: 50,
        ..SolverOptions::default()
    };
    let reports = solve_groups(&[normal, huge], &options).expect("runner");

    assert!(reports[0].is_solved());
    match &reports[1].outcome {
        GroupOutcome::NoSolution(msg) => assert!(msg.contains("too far apart"), "{msg}"),
        outcome => panic!("expected no solution, got {outcome:?}"),
    }
}
