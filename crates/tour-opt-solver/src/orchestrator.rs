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

use crate::registry::TourRegistry;
use num_traits::{Bounded, Zero};
use std::time::{Duration, Instant};
use tour_opt_core::prelude::{CostNumeric, NodeId, Objective};
use tour_opt_engine::prelude::{EngineError, EngineSession, Instance};
use tour_opt_model::prelude::SolverParams;

/// Budgets for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub max_trials: u32,
    pub time_limit: Duration,
}

impl RunConfig {
    #[inline]
    pub const fn new(max_trials: u32, time_limit: Duration) -> Self {
        Self {
            max_trials,
            time_limit,
        }
    }
}

impl From<&SolverParams> for RunConfig {
    #[inline]
    fn from(params: &SolverParams) -> Self {
        Self::new(params.max_trials, params.time_limit)
    }
}

/// What one completed trial produced. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialRecord<T> {
    pub trial: u32,
    pub cost: T,
    pub penalty: T,
}

/// Result of one full run.
///
/// `best.cost == T::max_value()` means no trial result was ever accepted;
/// the tour is then empty. After a bootstrap run (`max_trials == 0`) the
/// penalty is real but the cost stays at the maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome<T> {
    pub best: Objective<T>,
    pub tour: Vec<NodeId>,
    pub dimension: usize,
    pub best_trial: u32,
    pub trials: Vec<TrialRecord<T>>,
}

/// Drives one engine session through a full run: initialization, the
/// trial loop with strict lexicographic acceptance, and finalization.
///
/// Failure handling follows three classes. Initialization failures abort
/// the run. Per-trial failures (start-node selection, construction, the
/// search itself) log a warning and skip that trial. Post-acceptance
/// bookkeeping failures (snapshot, candidate adjustment, kick preparation)
/// log a warning and keep going; the acceptance itself stands.
#[derive(Debug)]
pub struct TrialOrchestrator<T, S> {
    session: S,
    config: RunConfig,
    registry: TourRegistry<T>,
}

impl<T, S> TrialOrchestrator<T, S>
where
    T: CostNumeric,
    S: EngineSession<T>,
{
    pub fn new(session: S, config: RunConfig) -> Self {
        Self {
            session,
            config,
            registry: TourRegistry::new(),
        }
    }

    #[inline]
    pub fn session(&self) -> &S {
        &self.session
    }

    #[inline]
    pub fn into_session(self) -> S {
        self.session
    }

    #[inline]
    pub fn registry(&self) -> &TourRegistry<T> {
        &self.registry
    }

    #[tracing::instrument(level = "info", skip_all, fields(max_trials = self.config.max_trials))]
    pub fn run(
        &mut self,
        params: &SolverParams,
        problem: &Instance,
    ) -> Result<RunOutcome<T>, EngineError> {
        self.initialize(params, problem)?;

        let mut run_best = Objective::<T>::unbounded();
        let mut best_trial = 0u32;
        let mut trials = Vec::new();

        if self.config.max_trials == 0 {
            self.bootstrap(&mut run_best)?;
        } else {
            self.trial_loop(&mut run_best, &mut best_trial, &mut trials);
        }

        self.finalize(run_best, best_trial, trials)
    }

    fn initialize(&mut self, params: &SolverParams, problem: &Instance) -> Result<(), EngineError> {
        self.session.load_parameters(params)?;
        self.session.load_problem(problem)?;
        self.session.allocate_structures()?;
        self.session.build_candidate_set()?;
        self.session.initialize_statistics();
        self.session.reset_tour_fields();
        if self.session.is_hashing_enabled() {
            self.registry.initialize();
        }
        Ok(())
    }

    /// `max_trials == 0`: build one tour so the run reports a penalty, but
    /// never search and never accept a cost.
    fn bootstrap(&mut self, run_best: &mut Objective<T>) -> Result<(), EngineError> {
        let start = self.session.select_random_start_node()?;
        self.session.construct_initial_tour(start)?;
        run_best.penalty = self.session.calculate_penalty()?;
        tracing::info!(penalty = %run_best.penalty, "bootstrap tour constructed");
        Ok(())
    }

    fn trial_loop(
        &mut self,
        run_best: &mut Objective<T>,
        best_trial: &mut u32,
        trials: &mut Vec<TrialRecord<T>>,
    ) {
        let hashing = self.session.is_hashing_enabled();
        let started = Instant::now();

        for trial in 1..=self.config.max_trials {
            // The first trial always runs; the budget only stops later ones.
            if trial > 1 && started.elapsed() >= self.config.time_limit {
                tracing::info!(trial, "time limit reached, stopping trial loop");
                break;
            }

            let start = match self.session.select_random_start_node() {
                Ok(start) => start,
                Err(err) => {
                    tracing::warn!(trial, error = %err, "start node selection failed, skipping trial");
                    continue;
                }
            };
            if let Err(err) = self.session.construct_initial_tour(start) {
                tracing::warn!(trial, error = %err, "tour construction failed, skipping trial");
                continue;
            }
            let outcome = match self.session.run_local_search() {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(trial, error = %err, "local search failed, skipping trial");
                    continue;
                }
            };

            trials.push(TrialRecord {
                trial,
                cost: outcome.cost,
                penalty: outcome.penalty,
            });

            if hashing {
                let sig = self.session.compute_tour_signature();
                if self.registry.contains(sig) {
                    tracing::debug!(trial, signature = %sig, "local optimum already seen");
                    continue;
                }
            }

            let objective = outcome.objective();
            if !objective.improves_over(run_best) {
                continue;
            }

            *run_best = objective;
            *best_trial = trial;
            tracing::info!(
                trial,
                penalty = %objective.penalty,
                cost = %objective.cost,
                "accepted new run best"
            );
            self.record_acceptance(trial, objective);
        }
    }

    /// Post-acceptance bookkeeping. Failures here do not undo the
    /// acceptance; the numeric best is already updated.
    fn record_acceptance(&mut self, trial: u32, objective: Objective<T>) {
        if let Err(err) = self.session.snapshot_best_tour() {
            tracing::warn!(trial, error = %err, "failed to snapshot accepted tour");
        }
        if let Err(err) = self.session.adjust_candidate_set() {
            tracing::warn!(trial, error = %err, "failed to adjust candidate set");
        }
        if let Err(err) = self.session.prepare_next_kick() {
            tracing::warn!(trial, error = %err, "failed to prepare next kick");
        }
        if self.session.is_hashing_enabled() {
            let sig = self.session.compute_tour_signature();
            self.registry.insert(sig, objective.cost);
        }
    }

    fn finalize(
        &mut self,
        run_best: Objective<T>,
        best_trial: u32,
        trials: Vec<TrialRecord<T>>,
    ) -> Result<RunOutcome<T>, EngineError> {
        self.session.finalize_tour_fields()?;

        let penalty = if run_best.penalty == T::max_value() {
            T::zero()
        } else {
            run_best.penalty
        };
        self.session.set_working_penalty(penalty);
        if let Err(err) = self.session.reconcile_global_best() {
            tracing::warn!(error = %err, "failed to reconcile engine-global best");
        }

        let tour = if run_best.cost == T::max_value() {
            // Nothing was ever accepted; report a degenerate empty tour
            // rather than pretending the engine has one.
            Vec::new()
        } else {
            self.session.get_best_tour()?
        };

        Ok(RunOutcome {
            best: Objective::new(penalty, run_best.cost),
            tour,
            dimension: self.session.get_dimension(),
            best_trial,
            trials,
        })
    }
}
