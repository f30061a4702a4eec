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

use tour_opt_engine::prelude::EngineError;

/// One worker's fatal initialization failure.
#[derive(Debug)]
pub struct WorkerFailure {
    pub worker_id: usize,
    pub seed: u64,
    pub error: EngineError,
}

impl std::fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "worker {} (seed {}): {}",
            self.worker_id, self.seed, self.error
        )
    }
}

#[derive(Debug)]
pub enum SolverError {
    /// The seed list and the worker count disagree. Raised before any
    /// worker starts.
    SeedCountMismatch { seeds: usize, workers: usize },
    /// Every worker failed; carries each worker's failure.
    AllWorkersFailed(Vec<WorkerFailure>),
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::SeedCountMismatch { seeds, workers } => {
                write!(
                    f,
                    "seed count {} does not match worker count {}",
                    seeds, workers
                )
            }
            SolverError::AllWorkersFailed(failures) => {
                write!(f, "all {} workers failed", failures.len())?;
                for failure in failures {
                    write!(f, "; {}", failure)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SolverError {}
