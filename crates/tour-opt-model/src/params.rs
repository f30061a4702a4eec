// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::err::ParamsError;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
    time::Duration,
};

/// Solver parameters in the `KEY = VALUE` text format.
///
/// Unknown keys are skipped with a debug log so parameter files written for
/// richer engines keep loading. `#`-prefixed and blank lines are comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverParams {
    pub problem_file: Option<PathBuf>,
    pub max_trials: u32,
    pub runs: u32,
    pub seed: u64,
    pub time_limit: Duration,
    pub trace_level: u32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            problem_file: None,
            max_trials: 10,
            runs: 1,
            seed: 1,
            time_limit: Duration::from_secs(3600),
            trace_level: 1,
        }
    }
}

impl SolverParams {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bufread<R: BufRead>(r: R) -> Result<Self, ParamsError> {
        let mut params = Self::default();

        for line in r.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ParamsError::MalformedLine(line.to_string()));
            };
            let key = key.trim().to_ascii_uppercase();
            let value = value.trim();

            match key.as_str() {
                "PROBLEM_FILE" => params.problem_file = Some(PathBuf::from(value)),
                "MAX_TRIALS" => params.max_trials = parse(&key, value)?,
                "RUNS" => params.runs = parse(&key, value)?,
                "SEED" => params.seed = parse(&key, value)?,
                "TIME_LIMIT" => {
                    let secs: u64 = parse(&key, value)?;
                    params.time_limit = Duration::from_secs(secs);
                }
                "TRACE_LEVEL" => params.trace_level = parse(&key, value)?,
                _ => {
                    tracing::debug!(key = %key, "ignoring unknown parameter");
                }
            }
        }

        Ok(params)
    }

    #[inline]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let file = File::open(path)?;
        Self::from_bufread(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(r: R) -> Result<Self, ParamsError> {
        Self::from_bufread(BufReader::new(r))
    }

    #[inline]
    pub fn from_str_content(s: &str) -> Result<Self, ParamsError> {
        Self::from_reader(s.as_bytes())
    }
}

#[inline]
fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ParamsError> {
    value.parse::<T>().map_err(|_| ParamsError::BadValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
