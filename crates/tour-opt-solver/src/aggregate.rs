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

use crate::{
    err::{SolverError, WorkerFailure},
    orchestrator::RunOutcome,
};
use tour_opt_core::prelude::{CostNumeric, NodeId, Objective};
use tour_opt_engine::prelude::EngineError;

/// What one worker produced. An error-carrying result means the worker's
/// initialization failed; it never took part in the search.
#[derive(Debug)]
pub struct RunResult<T> {
    pub worker_id: usize,
    pub seed: u64,
    pub best: Objective<T>,
    pub tour: Vec<NodeId>,
    pub dimension: usize,
    pub best_trial: u32,
    pub error: Option<EngineError>,
}

impl<T> RunResult<T>
where
    T: CostNumeric,
{
    pub fn from_outcome(worker_id: usize, seed: u64, outcome: RunOutcome<T>) -> Self {
        Self {
            worker_id,
            seed,
            best: outcome.best,
            tour: outcome.tour,
            dimension: outcome.dimension,
            best_trial: outcome.best_trial,
            error: None,
        }
    }

    pub fn failed(worker_id: usize, seed: u64, error: EngineError) -> Self {
        Self {
            worker_id,
            seed,
            best: Objective::unbounded(),
            tour: Vec::new(),
            dimension: 0,
            best_trial: 0,
            error: Some(error),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Deterministic reduction over worker results: the error-free result with
/// the lexicographically smallest `(penalty, cost)` wins, ties broken by
/// the lowest worker id. The collection order of `results` does not matter.
pub fn select_best<T>(results: Vec<RunResult<T>>) -> Result<RunResult<T>, SolverError>
where
    T: CostNumeric,
{
    let mut completed = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for result in results {
        if let Some(error) = result.error {
            failures.push(WorkerFailure {
                worker_id: result.worker_id,
                seed: result.seed,
                error,
            });
        } else {
            completed.push(result);
        }
    }

    completed
        .into_iter()
        .min_by_key(|result| (result.best, result.worker_id))
        .ok_or(SolverError::AllWorkersFailed(failures))
}
