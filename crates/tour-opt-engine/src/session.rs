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

use crate::err::EngineError;
use crate::problem::Instance;
use tour_opt_core::prelude::{CostNumeric, NodeId, Objective, TourSignature};
use tour_opt_model::prelude::SolverParams;

/// Result of one completed local-search descent.
///
/// Search failures are reported as `Err(EngineError)` by the session, so a
/// `TrialOutcome` always carries real numbers, never sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialOutcome<T> {
    pub cost: T,
    pub penalty: T,
}

impl<T> TrialOutcome<T>
where
    T: CostNumeric,
{
    #[inline]
    pub const fn new(cost: T, penalty: T) -> Self {
        Self { cost, penalty }
    }

    #[inline]
    pub fn objective(&self) -> Objective<T> {
        Objective::new(self.penalty, self.cost)
    }
}

/// One worker's private view of the local-search engine.
///
/// A session is owned by exactly one worker and is never shared. The
/// orchestrator drives it through a fixed lifecycle: the `load_*` and
/// `allocate_structures` group runs once during initialization, the
/// per-trial group runs inside the trial loop, and the finalize group runs
/// once at the end. Sessions keep whatever internal tour representation
/// they like; the orchestrator only sees costs, penalties, signatures and
/// the final visiting order.
pub trait EngineSession<T: CostNumeric> {
    fn load_parameters(&mut self, params: &SolverParams) -> Result<(), EngineError>;

    fn load_problem(&mut self, instance: &Instance) -> Result<(), EngineError>;

    /// Allocates the internal search structures for the loaded problem.
    /// Must be called after `load_problem` and before anything else.
    fn allocate_structures(&mut self) -> Result<(), EngineError>;

    fn build_candidate_set(&mut self) -> Result<(), EngineError>;

    fn initialize_statistics(&mut self);

    /// Clears per-run tour bookkeeping so a fresh run starts from nothing.
    fn reset_tour_fields(&mut self);

    fn select_random_start_node(&mut self) -> Result<NodeId, EngineError>;

    /// Builds the trial's starting tour from the given start node. After the
    /// first acceptance this perturbs the best-so-far tour instead of
    /// constructing from scratch.
    fn construct_initial_tour(&mut self, start: NodeId) -> Result<(), EngineError>;

    /// Descends to a local optimum and reports its objective.
    fn run_local_search(&mut self) -> Result<TrialOutcome<T>, EngineError>;

    /// Penalty of the current tour without searching.
    fn calculate_penalty(&mut self) -> Result<T, EngineError>;

    /// Records the current tour as the run's best (post-acceptance).
    fn snapshot_best_tour(&mut self) -> Result<(), EngineError>;

    fn adjust_candidate_set(&mut self) -> Result<(), EngineError>;

    fn prepare_next_kick(&mut self) -> Result<(), EngineError>;

    /// Restores the snapshot as the working tour for final reporting.
    fn finalize_tour_fields(&mut self) -> Result<(), EngineError>;

    /// Sets the penalty the session reports for its working tour.
    fn set_working_penalty(&mut self, penalty: T);

    /// Folds the run's best into the session's cross-run best.
    fn reconcile_global_best(&mut self) -> Result<(), EngineError>;

    /// The best tour as a closed cycle: the visiting order with the first
    /// node repeated at the end.
    fn get_best_tour(&self) -> Result<Vec<NodeId>, EngineError>;

    fn get_dimension(&self) -> usize;

    /// Whether the run should maintain a signature registry at all.
    fn is_hashing_enabled(&self) -> bool;

    /// Fingerprint of the current tour. Rotations and reflections of the
    /// same cycle must map to the same signature.
    fn compute_tour_signature(&self) -> TourSignature;
}
