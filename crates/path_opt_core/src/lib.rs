//! Depot-anchored ordering of 2-D points.
//! Cheapest-arc construction followed by 2-opt / relocate guided local search,
//! with a parallel runner for independent point groups.

mod algo;
mod error;
mod io;
pub mod logging;
mod matrix;
mod node;
mod runner;
mod tour;

pub(crate) use io::options;

pub use algo::construct::{Construction, cheapest_arc_path};
pub use algo::search::{
    LocalSearch, Phase, SearchOutcome, SearchParams, StopReason, optimize_order,
};
pub use error::{Error, Result};
pub use io::input::{PointGroup, SolverInput};
pub use io::options::{LogFormat, LogLevel, Neighborhood, SolverOptions};
pub use matrix::{COST_SCALE, DistanceMatrix};
pub use node::Point;
pub use runner::{GroupOutcome, GroupReport, solve_groups, write_reports};
pub use tour::{PathReport, path_length, validate_order};

/// Index of the fixed start node in every point set.
pub const DEPOT: usize = 0;
