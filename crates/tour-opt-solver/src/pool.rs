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
    aggregate::{select_best, RunResult},
    err::SolverError,
    orchestrator::{RunConfig, TrialOrchestrator},
};
use parking_lot::Mutex;
use tour_opt_core::prelude::CostNumeric;
use tour_opt_engine::prelude::{EngineSession, Instance};
use tour_opt_model::prelude::SolverParams;

/// Produces one isolated engine session per worker. Sessions are created
/// on the worker's own thread and never cross it, so they do not have to
/// be `Send`.
pub trait SessionFactory<T: CostNumeric>: Sync {
    type Session: EngineSession<T>;

    fn create(&self, seed: u64) -> Self::Session;
}

/// Adapter turning a `Fn(u64) -> Session` closure into a factory.
pub struct FnFactory<F>(pub F);

impl<T, S, F> SessionFactory<T> for FnFactory<F>
where
    T: CostNumeric,
    S: EngineSession<T>,
    F: Fn(u64) -> S + Sync,
{
    type Session = S;

    #[inline]
    fn create(&self, seed: u64) -> S {
        (self.0)(seed)
    }
}

/// The conventional seed list for `workers` workers: `1..=workers`.
#[inline]
pub fn default_seeds(workers: usize) -> Vec<u64> {
    (1..=workers as u64).collect()
}

/// Immutable input to one worker. Built once before the worker starts;
/// the worker shares nothing else with its siblings.
#[derive(Debug, Clone, Copy)]
pub struct WorkerTask<'a> {
    pub worker_id: usize,
    pub seed: u64,
    pub config: RunConfig,
    pub params: &'a SolverParams,
    pub problem: &'a Instance,
}

fn run_worker<T, F>(factory: &F, task: WorkerTask<'_>) -> RunResult<T>
where
    T: CostNumeric,
    F: SessionFactory<T>,
{
    let span = tracing::info_span!("worker", worker_id = task.worker_id, seed = task.seed);
    let _guard = span.enter();

    let session = factory.create(task.seed);
    let mut orchestrator = TrialOrchestrator::new(session, task.config);
    match orchestrator.run(task.params, task.problem) {
        Ok(outcome) => {
            tracing::info!(best = %outcome.best, "worker finished");
            RunResult::from_outcome(task.worker_id, task.seed, outcome)
        }
        Err(error) => {
            tracing::warn!(error = %error, "worker failed");
            RunResult::failed(task.worker_id, task.seed, error)
        }
    }
}

/// Runs independent randomized restarts on scoped threads and reduces
/// their results deterministically.
///
/// Every worker owns its session and its orchestrator; the only shared
/// state is the result sink. A worker whose run errors reports an
/// error-carrying result and never disturbs its siblings.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    config: RunConfig,
}

impl WorkerPool {
    #[inline]
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    #[tracing::instrument(level = "info", skip_all, fields(workers = workers))]
    pub fn run<T, F>(
        &self,
        factory: &F,
        params: &SolverParams,
        problem: &Instance,
        workers: usize,
        seeds: &[u64],
    ) -> Result<RunResult<T>, SolverError>
    where
        T: CostNumeric,
        F: SessionFactory<T>,
    {
        if seeds.len() != workers {
            return Err(SolverError::SeedCountMismatch {
                seeds: seeds.len(),
                workers,
            });
        }

        let results = Mutex::new(Vec::with_capacity(workers));
        std::thread::scope(|scope| {
            for (worker_id, &seed) in seeds.iter().enumerate() {
                let task = WorkerTask {
                    worker_id,
                    seed,
                    config: self.config,
                    params,
                    problem,
                };
                let results = &results;
                scope.spawn(move || {
                    results.lock().push(run_worker(factory, task));
                });
            }
        });

        select_best(results.into_inner())
    }
}
