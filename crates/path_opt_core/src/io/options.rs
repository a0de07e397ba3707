use std::{env, path::Path, time::Duration};

use log::LevelFilter;
use path_opt_derive::{CliOptions, CliValue, KvDisplay};

use crate::{Error, Result};

const DEFAULT_TIME_LIMIT_SECONDS: f64 = 10.0;
const DEFAULT_GLS_LAMBDA: f64 = 0.1;

/// Runtime options for path optimization.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct SolverOptions {
    /// Wall-clock budget per point group, in seconds.
    #[cli(long = "time-limit")]
    pub time_limit: f64,
    /// Cap on improvement passes per group. 0 means unlimited.
    #[cli(long = "max-iterations")]
    pub max_iterations: usize,
    /// Guided local search penalty weight `alpha`. 0 disables penalties.
    #[cli(long = "gls-lambda")]
    pub gls_lambda: f64,
    /// Local search moves to try.
    #[cli(long = "neighborhood", parse_with = "Neighborhood::parse")]
    pub neighborhood: Neighborhood,
    /// Worker threads for optimizing groups in parallel. 0 uses all cores.
    #[cli(long = "threads")]
    pub threads: usize,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(long = "log-timestamp", flag)]
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    #[cli(long = "log-output")]
    #[kv(fmt = "or-dash")]
    pub log_output: String,
    /// Optional input file path for point groups. Empty means stdin.
    #[cli(long = "input")]
    #[kv(fmt = "or-dash")]
    pub input: String,
    /// Optional output file path for orders and distances. Empty means stdout.
    #[cli(long = "output")]
    #[kv(fmt = "or-dash")]
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "neighborhood")]
pub enum Neighborhood {
    #[cli(alias = "2opt")]
    TwoOpt,
    #[cli(alias = "2opt-relocate")]
    TwoOptRelocate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT_SECONDS,
            max_iterations: 0,
            gls_lambda: DEFAULT_GLS_LAMBDA,
            neighborhood: Neighborhood::TwoOptRelocate,
            threads: 0,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        let options = Self::parse_from_iter(env::args().skip(1))?;
        options.validate()?;
        Ok(options)
    }

    fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.time_limit.is_finite() || self.time_limit <= 0.0 {
            return Err(Error::invalid_input(format!(
                "time_limit must be a positive number of seconds, got {}",
                self.time_limit
            )));
        }
        if Duration::try_from_secs_f64(self.time_limit).is_err() {
            return Err(Error::invalid_input(format!(
                "time_limit is too large: {} seconds",
                self.time_limit
            )));
        }
        if !self.gls_lambda.is_finite() || self.gls_lambda < 0.0 {
            return Err(Error::invalid_input(format!(
                "gls_lambda must be >= 0, got {}",
                self.gls_lambda
            )));
        }
        Ok(())
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  path-opt [options] [--input groups.txt]\n",
            "  path-opt [options] < groups.txt\n\n",
            "Input: `[name]` starts a group, other lines hold `x,y` tokens.\n",
            "The first point of each group is its depot.\n\n",
            "Options:\n",
            "  --time-limit <f64 seconds>\n",
            "  --max-iterations <usize, 0 = unlimited>\n",
            "  --gls-lambda <f64>\n",
            "  --neighborhood <two-opt|two-opt-relocate>\n",
            "  --threads <usize, 0 = all cores>\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --input <path>\n",
            "  --output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  path-opt --input cutouts.txt --output order.txt\n",
            "  path-opt --time-limit=2 --log-level=info < cutouts.txt\n",
            "  path-opt --neighborhood=two-opt --max-iterations=500 < cutouts.txt\n",
        )
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        non_dash_path(&self.log_output)
    }

    pub fn output_path(&self) -> Option<&Path> {
        non_dash_path(&self.output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        non_dash_path(&self.input)
    }
}

fn non_dash_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}
