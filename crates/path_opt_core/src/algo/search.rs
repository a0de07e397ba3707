//! 2-opt / relocate local search with guided-local-search penalties.
//!
//! Moves are scored on the penalized closed-cycle cost
//! `cost(a, b) + lambda * penalty(a, b)` while the raw cycle cost of the working
//! tour is tracked alongside. The incumbent is the lowest raw cost ever seen and
//! is the only tour handed back to the caller.

use std::{
    fmt,
    time::{Duration, Instant},
};

use crate::{
    DEPOT, Error, Result,
    algo::{construct::cheapest_arc_path, penalty::PenaltyMatrix},
    matrix::DistanceMatrix,
    node::Point,
    options::{Neighborhood, SolverOptions},
    tour::validate_order,
};

const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);
const DEFAULT_LAMBDA_COEFFICIENT: f64 = 0.1;
/// Every closed cycle over this many nodes or fewer has the same cost.
const MAX_TRIVIAL_NODES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchParams {
    /// Wall-clock budget for one point set, construction included.
    pub time_limit: Duration,
    /// Cap on improvement passes. 0 means unlimited.
    pub max_iterations: usize,
    /// GLS `alpha`: lambda is `alpha * local_optimum_cost / n`. 0 disables penalties.
    pub lambda_coefficient: f64,
    pub neighborhood: Neighborhood,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            max_iterations: 0,
            lambda_coefficient: DEFAULT_LAMBDA_COEFFICIENT,
            neighborhood: Neighborhood::TwoOptRelocate,
        }
    }
}

impl From<&SolverOptions> for SearchParams {
    fn from(options: &SolverOptions) -> Self {
        Self {
            // out-of-range limits are rejected by `SolverOptions::validate`
            time_limit: Duration::try_from_secs_f64(options.time_limit).unwrap_or(Duration::MAX),
            max_iterations: options.max_iterations,
            lambda_coefficient: options.gls_lambda,
            neighborhood: options.neighborhood,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Construct,
    Improve,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Construct => "construct",
            Self::Improve => "improve",
            Self::Done => "done",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Too few nodes for any move to change the cost.
    NoMoves,
    /// Local optimum reached with penalties disabled.
    LocalOptimum,
    IterationCap,
    Deadline,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoMoves => "no-moves",
            Self::LocalOptimum => "local-optimum",
            Self::IterationCap => "iteration-cap",
            Self::Deadline => "deadline",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Depot-first visiting order. The return to the depot is not repeated.
    pub order: Vec<usize>,
    /// Closed-cycle cost of the constructed tour, in matrix units.
    pub initial_cost: i64,
    /// Closed-cycle cost of `order`, in matrix units.
    pub cost: i64,
    pub passes: usize,
    pub local_optima: usize,
    pub stop: StopReason,
    pub construction_complete: bool,
}

struct SearchState {
    penalties: PenaltyMatrix,
    working: Vec<usize>,
    working_cost: i64,
    incumbent: Vec<usize>,
    incumbent_cost: i64,
    lambda: i64,
    deadline: Instant,
}

impl SearchState {
    fn record_if_better(&mut self) {
        if self.working_cost < self.incumbent_cost {
            self.incumbent.clone_from(&self.working);
            self.incumbent_cost = self.working_cost;
        }
    }
}

/// One optimization run over a fixed distance matrix.
pub struct LocalSearch<'a> {
    matrix: &'a DistanceMatrix,
    params: SearchParams,
    phase: Phase,
    initial_order: Option<Vec<usize>>,
}

impl<'a> LocalSearch<'a> {
    pub fn new(matrix: &'a DistanceMatrix, params: SearchParams) -> Self {
        Self {
            matrix,
            params,
            phase: Phase::Init,
            initial_order: None,
        }
    }

    /// Starts the search from `order` instead of the cheapest-arc construction.
    pub fn with_initial_order(mut self, order: Vec<usize>) -> Self {
        self.initial_order = Some(order);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run(&mut self) -> Result<SearchOutcome> {
        let n = self.matrix.len();
        let deadline = deadline_after(self.params.time_limit);

        if n == 0 {
            self.enter(Phase::Done);
            return Ok(SearchOutcome {
                order: Vec::new(),
                initial_cost: 0,
                cost: 0,
                passes: 0,
                local_optima: 0,
                stop: StopReason::NoMoves,
                construction_complete: true,
            });
        }

        if !self.matrix.cost_sums_fit() {
            self.enter(Phase::Done);
            return Err(Error::invalid_input(format!(
                "coordinates too far apart: max scaled distance {} over n={n} overflows tour costs",
                self.matrix.max_cost()
            )));
        }

        self.enter(Phase::Construct);
        let (initial, construction_complete) = match self.initial_order.take() {
            Some(order) => {
                validate_order(&order, n).map_err(|e| Error::invalid_input(e.to_string()))?;
                (order, true)
            }
            None => {
                let construction = cheapest_arc_path(self.matrix, DEPOT, Some(deadline));
                (construction.order, construction.complete)
            }
        };
        let initial_cost = self.matrix.cycle_cost(&initial);

        let mut state = SearchState {
            penalties: PenaltyMatrix::new(n),
            working: initial.clone(),
            working_cost: initial_cost,
            incumbent: initial,
            incumbent_cost: initial_cost,
            lambda: 0,
            deadline,
        };

        self.enter(Phase::Improve);
        let (passes, local_optima, stop) = self.improve(&mut state);

        self.enter(Phase::Done);
        validate_order(&state.incumbent, n)
            .map_err(|e| Error::no_solution(format!("search produced an invalid tour: {e}")))?;
        debug_assert_eq!(state.incumbent_cost, self.matrix.cycle_cost(&state.incumbent));

        log::info!(
            "search: done n={n} initial={initial_cost} best={} passes={passes} optima={local_optima} penalties={} stop={stop}",
            state.incumbent_cost,
            state.penalties.total()
        );

        Ok(SearchOutcome {
            order: state.incumbent,
            initial_cost,
            cost: state.incumbent_cost,
            passes,
            local_optima,
            stop,
            construction_complete,
        })
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("search.phase: {} -> {phase}", self.phase);
        self.phase = phase;
    }

    fn improve(&self, state: &mut SearchState) -> (usize, usize, StopReason) {
        if state.working.len() <= MAX_TRIVIAL_NODES {
            return (0, 0, StopReason::NoMoves);
        }

        let mut passes = 0;
        let mut local_optima = 0;
        loop {
            if self.params.max_iterations > 0 && passes >= self.params.max_iterations {
                return (passes, local_optima, StopReason::IterationCap);
            }
            if Instant::now() >= state.deadline {
                return (passes, local_optima, StopReason::Deadline);
            }
            passes += 1;

            let mut improved = self.two_opt_pass(state);
            if self.params.neighborhood == Neighborhood::TwoOptRelocate {
                improved |= self.relocate_pass(state);
            }
            debug_assert_eq!(state.working_cost, self.matrix.cycle_cost(&state.working));

            if improved {
                continue;
            }

            local_optima += 1;
            if local_optima == 1 {
                state.lambda = initial_lambda(
                    self.params.lambda_coefficient,
                    state.working_cost,
                    state.working.len(),
                );
                log::debug!(
                    "search.gls: first local optimum cost={} lambda={}",
                    state.working_cost,
                    state.lambda
                );
            }
            if state.lambda == 0 {
                return (passes, local_optima, StopReason::LocalOptimum);
            }
            let bumped = state
                .penalties
                .penalize_max_utility(self.matrix, &state.working);
            log::trace!("search.gls: optimum={local_optima} bumped={bumped}");
        }
    }

    #[inline]
    fn penalized(&self, state: &SearchState, a: usize, b: usize) -> i128 {
        // widened so lambda * penalty and the four-term deltas cannot overflow
        i128::from(self.matrix.cost(a, b))
            + i128::from(state.lambda) * i128::from(state.penalties.get(a, b))
    }

    /// First-improvement sweep that reverses `working[i+1..=j]`.
    fn two_opt_pass(&self, state: &mut SearchState) -> bool {
        let n = state.working.len();
        let mut improved = false;

        for i in 0..(n - 2) {
            for j in (i + 2)..n {
                // reversing the whole tail only flips direction
                if i == 0 && j == n - 1 {
                    continue;
                }
                let t = &state.working;
                let (a, b, c, d) = (t[i], t[i + 1], t[j], t[(j + 1) % n]);

                let delta = self.penalized(state, a, c) + self.penalized(state, b, d)
                    - self.penalized(state, a, b)
                    - self.penalized(state, c, d);
                if delta >= 0 {
                    continue;
                }

                let m = self.matrix;
                state.working_cost += m.cost(a, c) + m.cost(b, d) - m.cost(a, b) - m.cost(c, d);
                state.working[i + 1..=j].reverse();
                state.record_if_better();
                improved = true;
            }
        }

        improved
    }

    /// First-improvement sweep that moves one non-depot node elsewhere.
    fn relocate_pass(&self, state: &mut SearchState) -> bool {
        let n = state.working.len();
        let mut improved = false;

        for p in 1..n {
            let t = &state.working;
            let (prev, v, next) = (t[p - 1], t[p], t[(p + 1) % n]);
            let removal_gain = self.penalized(state, prev, v) + self.penalized(state, v, next)
                - self.penalized(state, prev, next);

            let mut best: Option<(i128, usize)> = None;
            for q in 0..n {
                if q == p || q + 1 == p {
                    continue;
                }
                let (x, y) = (t[q], t[(q + 1) % n]);
                let delta = self.penalized(state, x, v) + self.penalized(state, v, y)
                    - self.penalized(state, x, y)
                    - removal_gain;
                if delta < 0 && best.is_none_or(|(d, _)| delta < d) {
                    best = Some((delta, q));
                }
            }

            let Some((_, q)) = best else {
                continue;
            };
            let m = self.matrix;
            let (x, y) = (t[q], t[(q + 1) % n]);
            state.working_cost += m.cost(x, v) + m.cost(v, y) - m.cost(x, y)
                - (m.cost(prev, v) + m.cost(v, next) - m.cost(prev, next));

            let node = state.working.remove(p);
            let insert_at = if q < p { q + 1 } else { q };
            state.working.insert(insert_at, node);
            state.record_if_better();
            improved = true;
        }

        improved
    }
}

fn deadline_after(limit: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(limit)
        .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365))
}

fn initial_lambda(coefficient: f64, local_optimum_cost: i64, n: usize) -> i64 {
    if coefficient <= 0.0 || n == 0 {
        return 0;
    }
    let lambda = (coefficient * local_optimum_cost as f64 / n as f64).round() as i64;
    lambda.max(1)
}

/// Runs the whole pipeline for one point set: matrix, construction, search.
#[path_opt_derive::timer("search")]
pub fn optimize_order(points: &[Point], params: &SearchParams) -> Result<SearchOutcome> {
    if let Some(idx) = points.iter().position(|p| !p.is_valid()) {
        return Err(Error::invalid_input(format!(
            "point {idx} has a non-finite coordinate: {}",
            points[idx]
        )));
    }

    let matrix = DistanceMatrix::from_points(points);
    LocalSearch::new(&matrix, *params).run()
}
