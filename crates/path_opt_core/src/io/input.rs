use std::{fs, io::Read};

use path_opt_derive::{KvDisplay, New};

use crate::{Error, Point, Result, options::SolverOptions};

const DEFAULT_GROUP_NAME: &str = "group0";

/// One independently optimized point set. `points[0]` is its depot.
#[derive(Clone, Debug, PartialEq, New)]
pub struct PointGroup {
    pub name: String,
    #[new(default)]
    pub points: Vec<Point>,
}

impl PointGroup {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Point groups read from `--input` or stdin.
#[derive(Clone, Debug, KvDisplay)]
pub struct SolverInput {
    #[kv(fmt = "or-dash")]
    pub source: String,
    #[kv(fmt = "len")]
    pub groups: Vec<PointGroup>,
    pub points: usize,
}

impl SolverInput {
    pub fn new(groups: Vec<PointGroup>) -> Self {
        let points = groups.iter().map(PointGroup::len).sum();
        Self {
            source: String::new(),
            groups,
            points,
        }
    }

    pub fn from_options(options: &SolverOptions) -> Result<Self> {
        let (source, text) = match options.input_path() {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    Error::invalid_input(format!("failed to read input {}: {e}", path.display()))
                })?;
                (path.display().to_string(), text)
            }
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                (String::new(), text)
            }
        };

        let mut input = Self::new(parse_groups(&text)?);
        input.source = source;
        Ok(input)
    }
}

/// Parses the `[name]` / `x,y` group format.
pub(crate) fn parse_groups(text: &str) -> Result<Vec<PointGroup>> {
    let mut groups: Vec<PointGroup> = Vec::new();

    for (line_idx, raw_line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = match raw_line.split_once('#') {
            Some((content, _comment)) => content,
            None => raw_line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let Some(name) = header.strip_suffix(']') else {
                return Err(Error::invalid_input(format!(
                    "Line {line_no}: unterminated group header: {line}"
                )));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Line {line_no}: empty group name"
                )));
            }
            groups.push(PointGroup::new(name.to_string()));
            continue;
        }

        if groups.is_empty() {
            groups.push(PointGroup::new(DEFAULT_GROUP_NAME.to_string()));
        }
        let Some(group) = groups.last_mut() else {
            continue;
        };
        for (tok_idx, tok) in line.split_whitespace().enumerate() {
            group.points.push(parse_point(tok, line_no, tok_idx + 1)?);
        }
    }

    if groups.is_empty() {
        return Err(Error::invalid_input("No point groups provided."));
    }

    Ok(groups)
}

fn parse_point(tok: &str, line_no: usize, tok_no: usize) -> Result<Point> {
    let at = || format!("Line {line_no} token {tok_no}");
    let mut it = tok.split(',');
    let x_s = it
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid_input(format!("{}: missing x", at())))?;
    let y_s = it
        .next()
        .ok_or_else(|| Error::invalid_input(format!("{}: missing y", at())))?;

    if it.next().is_some() {
        return Err(Error::invalid_input(format!(
            "{}: expected 'x,y' but got extra comma fields: {tok}",
            at()
        )));
    }

    let x: f64 = x_s
        .parse()
        .map_err(|_| Error::invalid_input(format!("{}: invalid x: {x_s}", at())))?;
    let y: f64 = y_s
        .parse()
        .map_err(|_| Error::invalid_input(format!("{}: invalid y: {y_s}", at())))?;

    Ok(Point::new(x, y))
}
