use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
};

use rayon::prelude::*;

use crate::{
    Error, PathReport, PointGroup, Result, SearchParams, StopReason, optimize_order,
    options::SolverOptions,
};

#[derive(Clone, Debug, PartialEq)]
pub enum GroupOutcome {
    Solved {
        order: Vec<usize>,
        report: PathReport,
        stop: StopReason,
        construction_complete: bool,
    },
    /// The group failed on its own; the message says why.
    NoSolution(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupReport {
    pub name: String,
    pub outcome: GroupOutcome,
}

impl GroupReport {
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, GroupOutcome::Solved { .. })
    }

    pub fn order(&self) -> Option<&[usize]> {
        match &self.outcome {
            GroupOutcome::Solved { order, .. } => Some(order),
            GroupOutcome::NoSolution(_) => None,
        }
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        match &self.outcome {
            GroupOutcome::Solved {
                order,
                report,
                construction_complete,
                ..
            } => {
                write!(f, "  order=")?;
                for (i, idx) in order.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{idx}")?;
                }
                writeln!(f)?;
                writeln!(f, "  unoptimized_distance={:.2}", report.unoptimized_distance)?;
                writeln!(f, "  optimized_distance={:.2}", report.optimized_distance)?;
                match report.speedup() {
                    Some(s) => writeln!(f, "  speedup={s:.2}x")?,
                    None => writeln!(f, "  speedup=n/a")?,
                }
                if !construction_complete {
                    writeln!(f, "  suboptimal=construction-incomplete")?;
                }
                Ok(())
            }
            GroupOutcome::NoSolution(_) => writeln!(f, "  no solution"),
        }
    }
}

/// Optimizes every group in parallel. Reports come back in input order.
///
/// A failing group becomes [`GroupOutcome::NoSolution`] and never aborts the
/// others. Only invalid options or a thread pool failure return `Err`.
#[path_opt_derive::timer()]
pub fn solve_groups(groups: &[PointGroup], options: &SolverOptions) -> Result<Vec<GroupReport>> {
    options.validate()?;
    let params = SearchParams::from(options);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build()
        .map_err(|e| Error::other(format!("rayon pool: {e}")))?;

    log::info!(
        "runner: start groups={} threads={} time_limit_s={:.1}",
        groups.len(),
        pool.current_num_threads(),
        options.time_limit
    );

    let reports: Vec<GroupReport> =
        pool.install(|| groups.par_iter().map(|g| solve_group(g, &params)).collect());

    let failed = reports.iter().filter(|r| !r.is_solved()).count();
    log::info!("runner: complete groups={} failed={failed}", reports.len());
    Ok(reports)
}

fn solve_group(group: &PointGroup, params: &SearchParams) -> GroupReport {
    log::debug!("runner.group: start name={} n={}", group.name, group.len());

    let outcome = match optimize_order(&group.points, params) {
        Ok(outcome) => {
            let report = PathReport::measure(&group.points, &outcome.order);
            log::info!(
                "runner.group: done name={} n={} {report} stop={} passes={}",
                group.name,
                group.len(),
                outcome.stop,
                outcome.passes
            );
            GroupOutcome::Solved {
                order: outcome.order,
                report,
                stop: outcome.stop,
                construction_complete: outcome.construction_complete,
            }
        }
        Err(e) => {
            log::warn!("runner.group: no solution name={} err={e}", group.name);
            GroupOutcome::NoSolution(e.to_string())
        }
    };

    GroupReport {
        name: group.name.clone(),
        outcome,
    }
}

/// Writes reports to `--output`, or stdout when unset.
pub fn write_reports(reports: &[GroupReport], options: &SolverOptions) -> Result<()> {
    match options.output_path() {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                Error::other(format!(
                    "failed to create output file {}: {e}",
                    path.display()
                ))
            })?;
            write_to(BufWriter::new(file), reports)
        }
        None => write_to(io::stdout().lock(), reports),
    }
}

fn write_to<W: Write>(mut out: W, reports: &[GroupReport]) -> Result<()> {
    for report in reports {
        write!(out, "{report}")?;
    }
    out.flush()?;
    Ok(())
}
