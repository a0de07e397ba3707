use std::time::Instant;

use log::info;

use path_opt_core::{Result, SolverInput, SolverOptions, logging, solve_groups, write_reports};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;
    let input = SolverInput::from_options(&options)?;

    info!("input: {input}");
    info!("options: {options}");

    let reports = solve_groups(&input.groups, &options)?;
    write_reports(&reports, &options)?;

    info!(
        "output: groups={} solved={} time={:.2}s",
        reports.len(),
        reports.iter().filter(|r| r.is_solved()).count(),
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
