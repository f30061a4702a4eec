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

//! Scripted engine session for orchestrator and pool tests. Each trial
//! consumes one [`Step`]; the session counts every lifecycle call so tests
//! can assert on side effects.

use std::collections::VecDeque;
use tour_opt_core::prelude::{Cost, NodeId, TourSignature};
use tour_opt_engine::prelude::{EngineError, EngineSession, Instance, TrialOutcome};
use tour_opt_model::prelude::SolverParams;

/// One scripted trial.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Construction succeeds and the search lands on a local optimum with
    /// this objective and signature.
    Optimum {
        penalty: Cost,
        cost: Cost,
        signature: u64,
    },
    /// Initial-tour construction fails.
    FailConstruction,
    /// Construction succeeds but the search fails.
    FailSearch,
}

impl Step {
    pub fn search(penalty: Cost, cost: Cost, signature: u64) -> Self {
        Step::Optimum {
            penalty,
            cost,
            signature,
        }
    }

    pub fn construction_failure() -> Self {
        Step::FailConstruction
    }

    pub fn search_failure() -> Self {
        Step::FailSearch
    }
}

#[derive(Debug)]
pub struct ScriptedSession {
    steps: VecDeque<Step>,
    pub fail_initialization: bool,
    pub hashing: bool,
    pub bootstrap_penalty: Cost,

    // Lifecycle counters and captures.
    pub constructions: u32,
    pub searches: u32,
    pub snapshots: u32,
    pub adjustments: u32,
    pub kicks_prepared: u32,
    pub working_penalty: Option<Cost>,
    pub finalized: bool,
    pub reconciled: bool,

    current: Option<Step>,
    has_snapshot: bool,
}

impl ScriptedSession {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            fail_initialization: false,
            hashing: true,
            bootstrap_penalty: 0,
            constructions: 0,
            searches: 0,
            snapshots: 0,
            adjustments: 0,
            kicks_prepared: 0,
            working_penalty: None,
            finalized: false,
            reconciled: false,
            current: None,
            has_snapshot: false,
        }
    }

    /// The fixed tour this fake always reports once a snapshot exists.
    pub fn reported_tour(&self) -> Vec<NodeId> {
        [1u32, 2, 3, 1].iter().map(|&n| NodeId::new(n)).collect()
    }
}

impl EngineSession<Cost> for ScriptedSession {
    fn load_parameters(&mut self, _params: &SolverParams) -> Result<(), EngineError> {
        Ok(())
    }

    fn load_problem(&mut self, _instance: &Instance) -> Result<(), EngineError> {
        Ok(())
    }

    fn allocate_structures(&mut self) -> Result<(), EngineError> {
        if self.fail_initialization {
            return Err(EngineError::NotAllocated);
        }
        Ok(())
    }

    fn build_candidate_set(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn initialize_statistics(&mut self) {}

    fn reset_tour_fields(&mut self) {
        self.has_snapshot = false;
        self.current = None;
    }

    fn select_random_start_node(&mut self) -> Result<NodeId, EngineError> {
        Ok(NodeId::new(1))
    }

    fn construct_initial_tour(&mut self, _start: NodeId) -> Result<(), EngineError> {
        self.current = self.steps.pop_front();
        if matches!(self.current, Some(Step::FailConstruction)) {
            return Err(EngineError::SearchFailed("scripted construction failure".into()));
        }
        self.constructions += 1;
        Ok(())
    }

    fn run_local_search(&mut self) -> Result<TrialOutcome<Cost>, EngineError> {
        match self.current {
            Some(Step::Optimum { penalty, cost, .. }) => {
                self.searches += 1;
                Ok(TrialOutcome::new(cost, penalty))
            }
            Some(Step::FailSearch) => {
                Err(EngineError::SearchFailed("scripted search failure".into()))
            }
            Some(Step::FailConstruction) | None => Err(EngineError::NoTour),
        }
    }

    fn calculate_penalty(&mut self) -> Result<Cost, EngineError> {
        Ok(self.bootstrap_penalty)
    }

    fn snapshot_best_tour(&mut self) -> Result<(), EngineError> {
        self.snapshots += 1;
        self.has_snapshot = true;
        Ok(())
    }

    fn adjust_candidate_set(&mut self) -> Result<(), EngineError> {
        self.adjustments += 1;
        Ok(())
    }

    fn prepare_next_kick(&mut self) -> Result<(), EngineError> {
        self.kicks_prepared += 1;
        Ok(())
    }

    fn finalize_tour_fields(&mut self) -> Result<(), EngineError> {
        self.finalized = true;
        Ok(())
    }

    fn set_working_penalty(&mut self, penalty: Cost) {
        self.working_penalty = Some(penalty);
    }

    fn reconcile_global_best(&mut self) -> Result<(), EngineError> {
        self.reconciled = true;
        Ok(())
    }

    fn get_best_tour(&self) -> Result<Vec<NodeId>, EngineError> {
        if !self.has_snapshot {
            return Err(EngineError::NoTour);
        }
        Ok(self.reported_tour())
    }

    fn get_dimension(&self) -> usize {
        3
    }

    fn is_hashing_enabled(&self) -> bool {
        self.hashing
    }

    fn compute_tour_signature(&self) -> TourSignature {
        match self.current {
            Some(Step::Optimum { signature, .. }) => TourSignature::new(signature),
            _ => TourSignature::new(0),
        }
    }
}
