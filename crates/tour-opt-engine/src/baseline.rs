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
    err::EngineError,
    problem::Instance,
    session::{EngineSession, TrialOutcome},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tour_opt_core::prelude::{Cost, NodeId, Objective, TourSignature};
use tour_opt_model::prelude::SolverParams;

/// Candidate list length per node.
const CANDIDATES_PER_NODE: usize = 8;

/// Seed for the per-node signature keys. Fixed so two sessions over the
/// same instance agree on signatures.
const SIGNATURE_KEY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Per-run counters, reset by `initialize_statistics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub descents: u32,
    pub snapshots: u32,
}

/// Reference engine: nearest-neighbor construction, first-improvement
/// 2-opt descent under a time-window lateness penalty, and double-bridge
/// perturbation of the run's best tour once a kick has been armed.
///
/// Tours are stored as zero-based index permutations; node identifiers
/// only become one-based at the `get_best_tour` boundary.
#[derive(Debug)]
pub struct BaselineEngine {
    rng: ChaCha8Rng,
    params: SolverParams,
    instance: Option<Instance>,
    dist: Vec<Vec<Cost>>,
    candidates: Vec<Vec<usize>>,
    signature_keys: Vec<u64>,
    current: Vec<usize>,
    snapshot: Option<Vec<usize>>,
    global_best: Option<(Objective<Cost>, Vec<usize>)>,
    working_penalty: Cost,
    kick_armed: bool,
    stats: SessionStats,
}

impl BaselineEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            params: SolverParams::default(),
            instance: None,
            dist: Vec::new(),
            candidates: Vec::new(),
            signature_keys: Vec::new(),
            current: Vec::new(),
            snapshot: None,
            global_best: None,
            working_penalty: 0,
            kick_armed: false,
            stats: SessionStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    #[inline]
    fn instance(&self) -> Result<&Instance, EngineError> {
        self.instance.as_ref().ok_or(EngineError::NotAllocated)
    }

    #[inline]
    fn node_count(&self) -> usize {
        self.instance.as_ref().map(Instance::len).unwrap_or(0)
    }

    /// Objective of a tour given as a zero-based visiting order. Travel
    /// starts at time zero at the first node; arriving early means waiting
    /// until the window opens, arriving late accumulates lateness as
    /// penalty. The closing leg back to the first node only adds cost.
    fn evaluate(&self, tour: &[usize]) -> Objective<Cost> {
        let inst = match self.instance.as_ref() {
            Some(inst) => inst,
            None => return Objective::unbounded(),
        };
        if tour.is_empty() {
            return Objective::new(0, 0);
        }

        let mut cost: Cost = 0;
        let mut penalty: Cost = 0;
        let mut time: i64 = 0;

        for (leg, &idx) in tour.iter().enumerate() {
            if leg > 0 {
                let d = self.dist[tour[leg - 1]][idx];
                cost += d;
                time += d;
            }
            let node = inst.node(idx);
            if time > node.window.latest {
                penalty += time - node.window.latest;
            }
            if time < node.window.earliest {
                time = node.window.earliest;
            }
            time += node.service;
        }
        cost += self.dist[tour[tour.len() - 1]][tour[0]];

        Objective::new(penalty, cost)
    }

    fn nearest_neighbor_tour(&mut self, start: usize) -> Result<Vec<usize>, EngineError> {
        let n = self.node_count();
        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        tour.push(start);
        visited[start] = true;

        while tour.len() < n {
            let here = tour[tour.len() - 1];

            // Candidate edges first, full scan as fallback.
            let mut next = self.candidates[here]
                .iter()
                .copied()
                .find(|&c| !visited[c]);
            if next.is_none() {
                next = (0..n)
                    .filter(|&j| !visited[j])
                    .min_by_key(|&j| self.dist[here][j]);
            }
            let next = next.ok_or(EngineError::NoCandidates {
                node: NodeId::new(here as u32 + 1),
            })?;
            visited[next] = true;
            tour.push(next);
        }

        Ok(tour)
    }

    /// Double-bridge: cut the tour into four segments and swap the middle
    /// two. The classic 4-opt move a 2-opt descent cannot undo in one step.
    fn double_bridge(&mut self, tour: &[usize]) -> Vec<usize> {
        let n = tour.len();
        if n < 4 {
            return tour.to_vec();
        }
        let mut cuts = [
            self.rng.random_range(1..n),
            self.rng.random_range(1..n),
            self.rng.random_range(1..n),
        ];
        cuts.sort_unstable();
        let [p1, p2, p3] = cuts;

        let mut out = Vec::with_capacity(n);
        out.extend_from_slice(&tour[..p1]);
        out.extend_from_slice(&tour[p2..p3]);
        out.extend_from_slice(&tour[p1..p2]);
        out.extend_from_slice(&tour[p3..]);
        out
    }

    /// First-improvement 2-opt pass. Returns the improved objective, or
    /// `None` when no move improves.
    fn two_opt_pass(&mut self, best: Objective<Cost>) -> Option<Objective<Cost>> {
        let n = self.current.len();
        let mut scratch = self.current.clone();
        for i in 0..n.saturating_sub(1) {
            for j in (i + 1)..n {
                scratch[i..=j].reverse();
                let obj = self.evaluate(&scratch);
                if obj.improves_over(&best) {
                    self.current.copy_from_slice(&scratch);
                    return Some(obj);
                }
                scratch[i..=j].reverse();
            }
        }
        None
    }
}

impl EngineSession<Cost> for BaselineEngine {
    fn load_parameters(&mut self, params: &SolverParams) -> Result<(), EngineError> {
        self.params = params.clone();
        Ok(())
    }

    fn load_problem(&mut self, instance: &Instance) -> Result<(), EngineError> {
        if instance.is_empty() {
            return Err(EngineError::EmptyInstance);
        }
        self.instance = Some(instance.clone());
        Ok(())
    }

    fn allocate_structures(&mut self) -> Result<(), EngineError> {
        let n = self.instance()?.len();

        let mut dist = vec![vec![0; n]; n];
        for (i, row) in dist.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.instance()?.distance(i, j);
            }
        }
        self.dist = dist;

        let mut keys = ChaCha8Rng::seed_from_u64(SIGNATURE_KEY_SEED);
        self.signature_keys = (0..n).map(|_| keys.random::<u64>() | 1).collect();

        Ok(())
    }

    fn build_candidate_set(&mut self) -> Result<(), EngineError> {
        let n = self.instance()?.len();
        if self.dist.len() != n {
            return Err(EngineError::NotAllocated);
        }

        let k = CANDIDATES_PER_NODE.min(n.saturating_sub(1));
        let mut candidates = Vec::with_capacity(n);
        for i in 0..n {
            let mut order: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            order.sort_by_key(|&j| self.dist[i][j]);
            order.truncate(k);
            candidates.push(order);
        }
        self.candidates = candidates;
        Ok(())
    }

    fn initialize_statistics(&mut self) {
        self.stats = SessionStats::default();
    }

    fn reset_tour_fields(&mut self) {
        self.current.clear();
        self.snapshot = None;
        self.kick_armed = false;
        self.working_penalty = 0;
    }

    fn select_random_start_node(&mut self) -> Result<NodeId, EngineError> {
        let n = self.node_count();
        if n == 0 {
            return Err(EngineError::EmptyInstance);
        }
        let idx = self.rng.random_range(0..n);
        Ok(NodeId::new(idx as u32 + 1))
    }

    fn construct_initial_tour(&mut self, start: NodeId) -> Result<(), EngineError> {
        let n = self.node_count();
        if self.candidates.len() != n {
            return Err(EngineError::NotAllocated);
        }
        let start = start.get() as usize;
        if start == 0 || start > n {
            return Err(EngineError::SearchFailed(format!(
                "start node {} outside 1..={}",
                start, n
            )));
        }

        if self.kick_armed {
            if let Some(snapshot) = self.snapshot.clone() {
                self.current = self.double_bridge(&snapshot);
                return Ok(());
            }
        }
        self.current = self.nearest_neighbor_tour(start - 1)?;
        Ok(())
    }

    fn run_local_search(&mut self) -> Result<TrialOutcome<Cost>, EngineError> {
        if self.current.is_empty() {
            return Err(EngineError::NoTour);
        }

        let mut best = self.evaluate(&self.current);
        while let Some(improved) = self.two_opt_pass(best) {
            best = improved;
        }
        self.stats.descents += 1;
        if self.params.trace_level >= 2 {
            tracing::debug!(cost = best.cost, penalty = best.penalty, "descent complete");
        }

        Ok(TrialOutcome::new(best.cost, best.penalty))
    }

    fn calculate_penalty(&mut self) -> Result<Cost, EngineError> {
        if self.current.is_empty() {
            return Err(EngineError::NoTour);
        }
        Ok(self.evaluate(&self.current).penalty)
    }

    fn snapshot_best_tour(&mut self) -> Result<(), EngineError> {
        if self.current.is_empty() {
            return Err(EngineError::NoTour);
        }
        self.snapshot = Some(self.current.clone());
        self.stats.snapshots += 1;
        Ok(())
    }

    fn adjust_candidate_set(&mut self) -> Result<(), EngineError> {
        let Some(snapshot) = self.snapshot.clone() else {
            return Err(EngineError::NoTour);
        };
        if self.candidates.is_empty() {
            return Err(EngineError::NotAllocated);
        }

        // Promote the accepted tour's edges to the front of the lists so
        // construction keeps re-finding them.
        let n = snapshot.len();
        for (pos, &a) in snapshot.iter().enumerate() {
            let b = snapshot[(pos + 1) % n];
            for (from, to) in [(a, b), (b, a)] {
                let list = &mut self.candidates[from];
                if let Some(at) = list.iter().position(|&c| c == to) {
                    list.remove(at);
                }
                list.insert(0, to);
                list.truncate(CANDIDATES_PER_NODE.max(1));
            }
        }
        Ok(())
    }

    fn prepare_next_kick(&mut self) -> Result<(), EngineError> {
        if self.snapshot.is_none() {
            return Err(EngineError::NoTour);
        }
        self.kick_armed = true;
        Ok(())
    }

    fn finalize_tour_fields(&mut self) -> Result<(), EngineError> {
        match self.snapshot.clone() {
            Some(snapshot) => self.current = snapshot,
            None => self.current.clear(),
        }
        Ok(())
    }

    fn set_working_penalty(&mut self, penalty: Cost) {
        self.working_penalty = penalty;
    }

    fn reconcile_global_best(&mut self) -> Result<(), EngineError> {
        if self.current.is_empty() {
            return Ok(());
        }
        let obj = Objective::new(self.working_penalty, self.evaluate(&self.current).cost);
        let better = match &self.global_best {
            Some((incumbent, _)) => obj.improves_over(incumbent),
            None => true,
        };
        if better {
            self.global_best = Some((obj, self.current.clone()));
        }
        Ok(())
    }

    fn get_best_tour(&self) -> Result<Vec<NodeId>, EngineError> {
        if self.current.is_empty() {
            return Err(EngineError::NoTour);
        }
        let mut out: Vec<NodeId> = self
            .current
            .iter()
            .map(|&idx| NodeId::new(idx as u32 + 1))
            .collect();
        out.push(out[0]);
        Ok(out)
    }

    fn get_dimension(&self) -> usize {
        self.node_count()
    }

    fn is_hashing_enabled(&self) -> bool {
        true
    }

    /// XOR of per-edge keys over the closed cycle, with each edge keyed by
    /// the product of its endpoints' node keys. The product makes an edge
    /// direction-free and the XOR makes the cycle rotation-free, so any
    /// traversal of the same cycle yields the same signature.
    fn compute_tour_signature(&self) -> TourSignature {
        let n = self.current.len();
        if n == 0 {
            return TourSignature::new(0);
        }
        let mut sig: u64 = 0;
        for (pos, &a) in self.current.iter().enumerate() {
            let b = self.current[(pos + 1) % n];
            sig ^= self.signature_keys[a].wrapping_mul(self.signature_keys[b]);
        }
        TourSignature::new(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(BaselineEngine: Send);

    fn square_instance() -> Instance {
        // Unit square with wide-open windows.
        let text = "4\n\
                    0 0 0 1000 0\n\
                    0 10 0 1000 0\n\
                    10 10 0 1000 0\n\
                    10 0 0 1000 0\n";
        Instance::from_reader(text.as_bytes()).unwrap()
    }

    fn ready_engine(seed: u64, inst: &Instance) -> BaselineEngine {
        let mut engine = BaselineEngine::new(seed);
        engine.load_problem(inst).unwrap();
        engine.allocate_structures().unwrap();
        engine.build_candidate_set().unwrap();
        engine.initialize_statistics();
        engine.reset_tour_fields();
        engine
    }

    #[test]
    fn test_empty_instance_is_rejected() {
        let inst = Instance::from_reader("0\n".as_bytes()).unwrap();
        let mut engine = BaselineEngine::new(1);
        assert!(matches!(
            engine.load_problem(&inst),
            Err(EngineError::EmptyInstance)
        ));
    }

    #[test]
    fn test_operations_before_loading_report_not_allocated() {
        let mut engine = BaselineEngine::new(1);
        assert!(matches!(
            engine.allocate_structures(),
            Err(EngineError::NotAllocated)
        ));
        assert!(matches!(
            engine.build_candidate_set(),
            Err(EngineError::NotAllocated)
        ));
    }

    #[test]
    fn test_search_without_a_tour_is_no_tour() {
        let inst = square_instance();
        let mut engine = ready_engine(1, &inst);
        assert!(matches!(
            engine.run_local_search(),
            Err(EngineError::NoTour)
        ));
        assert!(matches!(
            engine.snapshot_best_tour(),
            Err(EngineError::NoTour)
        ));
        assert!(matches!(engine.get_best_tour(), Err(EngineError::NoTour)));
    }

    #[test]
    fn test_start_node_is_in_range() {
        let inst = square_instance();
        let mut engine = ready_engine(7, &inst);
        for _ in 0..32 {
            let start = engine.select_random_start_node().unwrap();
            assert!((1..=4).contains(&start.get()));
        }
    }

    #[test]
    fn test_construction_visits_every_node_once() {
        let inst = square_instance();
        let mut engine = ready_engine(1, &inst);
        engine.construct_initial_tour(NodeId::new(2)).unwrap();

        let mut seen = engine.current.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(engine.current[0], 1);
    }

    #[test]
    fn test_descent_reaches_the_square_perimeter() {
        let inst = square_instance();
        let mut engine = ready_engine(1, &inst);

        // Force the crossing order 0-2-1-3, which 2-opt must untangle.
        engine.current = vec![0, 2, 1, 3];
        let crossed = engine.evaluate(&engine.current);

        let outcome = engine.run_local_search().unwrap();
        assert_eq!(outcome.penalty, 0);
        assert_eq!(outcome.cost, 40);
        assert!(outcome.objective().improves_over(&crossed));
    }

    #[test]
    fn test_lateness_is_penalized_and_waiting_is_free() {
        // Two nodes 10 apart. Node 2 closes at 4, so arriving at 10 is 6
        // late. Node 1 opens at 0, no waiting anywhere else.
        let text = "2\n0 0 0 100 0\n10 0 0 4 0\n";
        let inst = Instance::from_reader(text.as_bytes()).unwrap();
        let mut engine = ready_engine(1, &inst);

        engine.current = vec![0, 1];
        let obj = engine.evaluate(&engine.current);
        assert_eq!(obj.cost, 20);
        assert_eq!(obj.penalty, 6);

        // Waiting: open node 2's window late instead and it costs nothing.
        let text = "2\n0 0 0 100 0\n10 0 50 90 0\n";
        let inst = Instance::from_reader(text.as_bytes()).unwrap();
        let mut engine = ready_engine(1, &inst);
        engine.current = vec![0, 1];
        let obj = engine.evaluate(&engine.current);
        assert_eq!(obj.cost, 20);
        assert_eq!(obj.penalty, 0);
    }

    #[test]
    fn test_signature_is_rotation_and_reflection_invariant() {
        let inst = square_instance();
        let mut engine = ready_engine(1, &inst);

        engine.current = vec![0, 1, 2, 3];
        let base = engine.compute_tour_signature();

        engine.current = vec![2, 3, 0, 1];
        assert_eq!(engine.compute_tour_signature(), base);

        engine.current = vec![3, 2, 1, 0];
        assert_eq!(engine.compute_tour_signature(), base);

        engine.current = vec![0, 2, 1, 3];
        assert_ne!(engine.compute_tour_signature(), base);
    }

    #[test]
    fn test_kick_produces_a_permutation_of_the_snapshot() {
        let inst = square_instance();
        let mut engine = ready_engine(3, &inst);
        engine.construct_initial_tour(NodeId::new(1)).unwrap();
        engine.snapshot_best_tour().unwrap();
        engine.prepare_next_kick().unwrap();

        engine.construct_initial_tour(NodeId::new(1)).unwrap();
        let mut seen = engine.current.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let inst = square_instance();
        let mut a = ready_engine(42, &inst);
        let mut b = ready_engine(42, &inst);

        for _ in 0..8 {
            assert_eq!(
                a.select_random_start_node().unwrap(),
                b.select_random_start_node().unwrap()
            );
        }
    }

    #[test]
    fn test_best_tour_is_a_closed_one_based_cycle() {
        let inst = square_instance();
        let mut engine = ready_engine(1, &inst);
        engine.construct_initial_tour(NodeId::new(1)).unwrap();
        engine.run_local_search().unwrap();
        engine.snapshot_best_tour().unwrap();
        engine.finalize_tour_fields().unwrap();

        let tour = engine.get_best_tour().unwrap();
        assert_eq!(tour.len(), 5);
        assert_eq!(tour.first(), tour.last());
        assert!(tour.iter().all(|n| (1..=4).contains(&n.get())));
    }

    #[test]
    fn test_finalize_without_snapshot_leaves_no_tour() {
        let inst = square_instance();
        let mut engine = ready_engine(1, &inst);
        engine.construct_initial_tour(NodeId::new(1)).unwrap();
        engine.finalize_tour_fields().unwrap();
        assert!(matches!(engine.get_best_tour(), Err(EngineError::NoTour)));
    }

    #[test]
    fn test_reconcile_keeps_the_better_run() {
        let inst = square_instance();
        let mut engine = ready_engine(1, &inst);

        engine.current = vec![0, 2, 1, 3];
        engine.set_working_penalty(0);
        engine.reconcile_global_best().unwrap();
        let first = engine.global_best.clone().unwrap().0;

        engine.current = vec![0, 1, 2, 3];
        engine.reconcile_global_best().unwrap();
        let second = engine.global_best.clone().unwrap().0;
        assert!(second.improves_over(&first));

        // A worse run does not replace it.
        engine.current = vec![0, 2, 1, 3];
        engine.reconcile_global_best().unwrap();
        assert_eq!(engine.global_best.clone().unwrap().0, second);
    }
}
