//! The solver: owner of the trail, the queue and the search stack, and the
//! single entry point for constraints, decision builders and monitors.

use std::any::Any;
use std::rc::Rc;

use log::debug;
use log::warn;

use crate::basic_types::Assignment;
use crate::basic_types::Failure;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Random;
use crate::basic_types::Stopwatch;
use crate::branching::ApplyBranchSelector;
use crate::branching::BranchSelector;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::branching::DecisionModification;
use crate::branching::ReverseDecision;
use crate::constraints::FalseConstraint;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::engine::monitors::DemonProfiler;
use crate::engine::monitors::PrintTrace;
use crate::engine::monitors::PropagationMonitor;
use crate::engine::monitors::SearchMonitor;
use crate::engine::monitors::TraceFanout;
use crate::engine::monitors::NO_PROGRESS;
use crate::engine::propagation::Action;
use crate::engine::propagation::Constraint;
use crate::engine::propagation::Demon;
use crate::engine::propagation::DemonEntry;
use crate::engine::propagation::DemonId;
use crate::engine::propagation::DemonPriority;
use crate::engine::queue::DemonQueue;
use crate::engine::search::MarkerKind;
use crate::engine::search::Search;
use crate::engine::search::SentinelCode;
use crate::engine::search::StateMarker;
use crate::engine::solver_statistics::SolverStatistics;
use crate::engine::state::RevBool;
use crate::engine::state::RevInt;
use crate::engine::state::RevInt64;
use crate::engine::state::RevPtr;
use crate::engine::state::RevU64;
use crate::engine::state::StateRegistry;
use crate::engine::trail::Trail;
use crate::engine::variables::IntVar;
use crate::engine::variables::IntVarData;
use crate::kabocha_assert_eq_simple;
use crate::kabocha_assert_moderate;
use crate::kabocha_assert_simple;
use crate::model_visitor::ModelVisitor;
use crate::options::ProfileLevel;
use crate::options::SolverOptions;
use crate::options::TraceLevel;
use crate::statistics::log_statistic_postfix;
use crate::statistics::LogStatistics;
use crate::statistics::StatisticLogger;
use crate::variable_names::PropagationObject;
use crate::variable_names::PropagationObjectNames;

/// The top-level state of the solver, driven by `next_solution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// No top-level search is open.
    OutsideSearch,
    /// Inside initial propagation of the root node.
    InRootNode,
    /// Inside a top-level search where the tree is being explored.
    InSearch,
    /// The last `next_solution` stopped at a solution.
    AtSolution,
    /// The search tree is exhausted.
    NoMoreSolutions,
    /// Initial propagation proved the model infeasible.
    ProblemInfeasible,
}

/// Bookkeeping of a cast constraint: the target variable stands for the
/// expression variable through the stored constraint.
struct CastInfo {
    expression: IntVar,
    #[allow(dead_code)]
    constraint: Rc<dyn Constraint>,
}

/// The constraint solver.
///
/// It owns the reversible trail, the demon queue and the stack of searches,
/// and it routes every state modification through the trail so that
/// backtracking can undo it. One instance must not be shared across threads;
/// the engine is single-threaded and synchronous.
pub struct Solver {
    name: String,
    options: SolverOptions,
    /// The top-level state, as observed between `next_solution` calls.
    status: SolverState,
    pub(crate) memory: StateRegistry,
    trail: Trail,
    queue: DemonQueue,
    /// The dummy base search, the top-level search, plus one per open nested
    /// solve. The active search is the last one.
    searches: Vec<Search>,
    pub(crate) vars: KeyedVec<IntVar, IntVarData>,
    demons: KeyedVec<DemonId, DemonEntry>,
    constraints: Vec<Rc<dyn Constraint>>,
    /// Constraints added while in the root node, posted after the main list
    /// together with the index of the constraint that added them.
    additional_constraints: Vec<(Rc<dyn Constraint>, usize)>,
    constraint_index: usize,
    additional_constraint_index: usize,
    cast_information: HashMap<IntVar, CastInfo>,
    statistics: SolverStatistics,
    fail_stamp: u64,
    /// Actions run on every failure; the reversible length makes additions
    /// during search disappear on backtrack.
    fail_hooks: Vec<Rc<dyn Action>>,
    fail_hooks_len: RevInt64,
    fail_intercept: Option<Rc<dyn Action>>,
    propagation_monitor: Rc<TraceFanout>,
    demon_profiler: Option<Rc<DemonProfiler>>,
    print_trace: Option<Rc<PrintTrace>>,
    names: PropagationObjectNames,
    anonymous_variable_index: usize,
    pub(crate) instruments_variables: bool,
    instruments_demons: bool,
    stopwatch: Stopwatch,
}

/// Construction and teardown.
impl Solver {
    pub fn new(name: impl Into<String>) -> Solver {
        Solver::with_options(name, SolverOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: SolverOptions) -> Solver {
        let instruments_variables = options.trace_level != TraceLevel::None;
        let instruments_demons =
            instruments_variables || options.profile_level != ProfileLevel::None;

        let mut solver = Solver {
            name: name.into(),
            trail: Trail::new(options.trail_block_size, options.trail_compression),
            queue: DemonQueue::new(),
            memory: StateRegistry::default(),
            searches: vec![Search::dummy(), Search::new()],
            vars: KeyedVec::default(),
            demons: KeyedVec::default(),
            constraints: Vec::new(),
            additional_constraints: Vec::new(),
            constraint_index: 0,
            additional_constraint_index: 0,
            cast_information: HashMap::default(),
            statistics: SolverStatistics::default(),
            status: SolverState::OutsideSearch,
            fail_stamp: 1,
            fail_hooks: Vec::new(),
            fail_hooks_len: RevInt64::default(),
            fail_intercept: None,
            propagation_monitor: Rc::new(TraceFanout::default()),
            demon_profiler: None,
            print_trace: None,
            names: PropagationObjectNames::default(),
            anonymous_variable_index: 0,
            instruments_variables,
            instruments_demons,
            stopwatch: Stopwatch::starting_now(),
            options,
        };

        solver.fail_hooks_len = solver.memory.new_int64(0);
        solver.push_sentinel(SentinelCode::SolverCtor);

        if solver.options.profile_level != ProfileLevel::None {
            let profiler = Rc::new(DemonProfiler::default());
            solver
                .propagation_monitor
                .add(Rc::clone(&profiler) as Rc<dyn PropagationMonitor>);
            solver.demon_profiler = Some(profiler);
        }
        if solver.options.trace_level != TraceLevel::None {
            let print_trace = Rc::new(PrintTrace);
            solver
                .propagation_monitor
                .add(Rc::clone(&print_trace) as Rc<dyn PropagationMonitor>);
            solver.print_trace = Some(print_trace);
        }

        solver
    }

    pub fn model_name(&self) -> &str {
        &self.name
    }
}

impl Drop for Solver {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        // Dropping with an open nested search is a programming error; the
        // nested solve must run to completion first.
        kabocha_assert_eq_simple!(
            self.searches.len(),
            2,
            "solver dropped with open nested searches"
        );
        // Unwind so pending reversible actions still run.
        self.backtrack_to_sentinel(SentinelCode::InitialSearch);
        if !self.active_search().marker_stack.is_empty() {
            let kind = self.pop_marker();
            kabocha_assert_simple!(
                matches!(kind, MarkerKind::Sentinel(SentinelCode::SolverCtor)),
                "not popping the constructor sentinel in the solver teardown"
            );
        }
    }
}

/// Search stack access.
impl Solver {
    pub(crate) fn active_search(&self) -> &Search {
        self.searches.last().expect("the search stack is never empty")
    }

    pub(crate) fn active_search_mut(&mut self) -> &mut Search {
        self.searches
            .last_mut()
            .expect("the search stack is never empty")
    }

    fn top_level_search(&self) -> &Search {
        &self.searches[1]
    }

    /// The number of open solves: 0 outside search, 1 in a top-level search,
    /// more inside nested solves.
    pub fn solve_depth(&self) -> usize {
        if self.status == SolverState::OutsideSearch {
            0
        } else {
            self.searches.len() - 1
        }
    }

    pub fn search_depth(&self) -> i32 {
        self.active_search().search_depth
    }

    pub fn search_left_depth(&self) -> i32 {
        self.active_search().left_search_depth
    }

    fn currently_in_solve(&self) -> bool {
        kabocha_assert_moderate!(self.solve_depth() > 0);
        self.active_search().created_by_solve
    }

    /// Install a monitor on the active search; it receives every event from
    /// now until the search is torn down.
    pub fn install_monitor(&mut self, monitor: Rc<dyn SearchMonitor>) {
        self.active_search_mut().monitors.push(monitor);
    }

    /// Register a monitor for propagation events.
    pub fn add_propagation_monitor(&self, monitor: Rc<dyn PropagationMonitor>) {
        self.propagation_monitor.add(monitor);
    }

    /// Ask the active search to stop; honoured at the next failure check.
    pub fn finish_current_search(&mut self) {
        self.active_search_mut().should_finish = true;
    }

    /// Ask the active search to restart from its root; honoured at the next
    /// failure check.
    pub fn restart_current_search(&mut self) {
        self.active_search_mut().should_restart = true;
    }

    pub(crate) fn set_branch_selector(&mut self, selector: Rc<dyn BranchSelector>) {
        // The undo cannot go on the trail directly: a nested search owning
        // the selector is destroyed on backtrack. The action checks the
        // solve depth instead.
        let solve_depth = self.solve_depth();
        self.add_backtrack_action(
            Rc::new(crate::branching::UndoBranchSelector::new(solve_depth)),
            false,
        );
        self.active_search_mut().branch_selector = Some(selector);
    }

    pub(crate) fn clear_branch_selector(&mut self) {
        self.active_search_mut().branch_selector = None;
    }

    /// A decision builder that installs `selector` on the search it runs in.
    pub fn make_apply_branch_selector(
        &self,
        selector: Rc<dyn BranchSelector>,
    ) -> Rc<dyn DecisionBuilder> {
        Rc::new(ApplyBranchSelector::new(selector))
    }
}

/// Introspection.
impl Solver {
    pub fn state(&self) -> SolverState {
        self.status
    }

    pub fn branches(&self) -> u64 {
        self.statistics.num_branches
    }

    pub fn fails(&self) -> u64 {
        self.statistics.num_fails
    }

    pub fn decisions(&self) -> u64 {
        self.statistics.num_decisions
    }

    pub fn restarts(&self) -> u64 {
        self.statistics.num_restarts
    }

    /// The number of solutions found by the current top-level search.
    pub fn solutions(&self) -> u64 {
        self.top_level_search().solution_counter
    }

    pub fn demon_runs(&self, priority: DemonPriority) -> u64 {
        match priority {
            DemonPriority::Normal => self.statistics.num_normal_demon_runs,
            DemonPriority::Var => self.statistics.num_var_demon_runs,
            DemonPriority::Delayed => self.statistics.num_delayed_demon_runs,
        }
    }

    /// The queue stamp; every propagation cycle and marker operation bumps
    /// it.
    pub fn stamp(&self) -> u64 {
        self.queue.stamp
    }

    /// Bumped once per handled failure.
    pub fn fail_stamp(&self) -> u64 {
        self.fail_stamp
    }

    pub fn wall_time_ms(&self) -> u64 {
        self.stopwatch.elapsed().as_millis() as u64
    }

    /// The engine's own accounting of reversible memory.
    pub fn memory_usage_bytes(&self) -> usize {
        self.trail.memory_usage_bytes() + self.memory.memory_usage_bytes()
    }

    pub fn random(&mut self) -> &mut impl Random {
        &mut self.options.random_generator
    }

    pub(crate) fn demon_debug_string(&self, demon: DemonId) -> String {
        self.demons[demon].demon.debug_string()
    }

    /// Log the solver statistics (and demon profiles when profiling) through
    /// the statistics sink.
    pub fn log_statistics(&self) {
        self.statistics.log_statistics(&StatisticLogger::default());
        if let Some(profiler) = &self.demon_profiler {
            profiler.log_statistics(self, &StatisticLogger::new("demon_"));
        }
        log_statistic_postfix();
    }
}

/// Reversible values: creation, reads, saves and save-and-set writes.
impl Solver {
    pub fn new_rev_int(&mut self, initial: i32) -> RevInt {
        self.memory.new_int(initial)
    }

    pub fn new_rev_int64(&mut self, initial: i64) -> RevInt64 {
        self.memory.new_int64(initial)
    }

    pub fn new_rev_u64(&mut self, initial: u64) -> RevU64 {
        self.memory.new_u64(initial)
    }

    pub fn new_rev_ptr(&mut self, initial: u64) -> RevPtr {
        self.memory.new_ptr(initial)
    }

    pub fn new_rev_bool(&mut self, initial: bool) -> RevBool {
        self.memory.new_bool(initial)
    }

    pub fn rev_int(&self, key: RevInt) -> i32 {
        self.memory.int(key)
    }

    pub fn rev_int64(&self, key: RevInt64) -> i64 {
        self.memory.int64(key)
    }

    pub fn rev_u64(&self, key: RevU64) -> u64 {
        self.memory.u64(key)
    }

    pub fn rev_ptr(&self, key: RevPtr) -> u64 {
        self.memory.ptr(key)
    }

    pub fn rev_bool(&self, key: RevBool) -> bool {
        self.memory.bool(key)
    }

    /// Trail the current value of the location. Repeated saves are legal and
    /// restore in LIFO order.
    pub fn save_int(&mut self, key: RevInt) {
        let old = self.memory.int(key);
        self.trail.save_int(key, old);
    }

    pub fn save_int64(&mut self, key: RevInt64) {
        let old = self.memory.int64(key);
        self.trail.save_int64(key, old);
    }

    pub fn save_u64(&mut self, key: RevU64) {
        let old = self.memory.u64(key);
        self.trail.save_u64(key, old);
    }

    pub fn save_ptr(&mut self, key: RevPtr) {
        let old = self.memory.ptr(key);
        self.trail.save_ptr(key, old);
    }

    pub fn save_bool(&mut self, key: RevBool) {
        let old = self.memory.bool(key);
        self.trail.save_bool(key, old);
    }

    /// Trail the old value, then write the new one; the no-op write is
    /// skipped entirely.
    pub fn save_and_set_int(&mut self, key: RevInt, value: i32) {
        let old = self.memory.int(key);
        if old != value {
            self.trail.save_int(key, old);
            self.memory.write_int(key, value);
        }
    }

    pub fn save_and_set_int64(&mut self, key: RevInt64, value: i64) {
        let old = self.memory.int64(key);
        if old != value {
            self.trail.save_int64(key, old);
            self.memory.write_int64(key, value);
        }
    }

    pub fn save_and_set_u64(&mut self, key: RevU64, value: u64) {
        let old = self.memory.u64(key);
        if old != value {
            self.trail.save_u64(key, old);
            self.memory.write_u64(key, value);
        }
    }

    pub fn save_and_set_ptr(&mut self, key: RevPtr, value: u64) {
        let old = self.memory.ptr(key);
        if old != value {
            self.trail.save_ptr(key, old);
            self.memory.write_ptr(key, value);
        }
    }

    pub fn save_and_set_bool(&mut self, key: RevBool, value: bool) {
        let old = self.memory.bool(key);
        if old != value {
            self.trail.save_bool(key, old);
            self.memory.write_bool(key, value);
        }
    }

    /// Register an object for release when the trail unwinds past this
    /// point. Returns a shared handle to the object.
    pub fn rev_alloc<T: 'static>(&mut self, object: T) -> Rc<T> {
        self.check_alloc_state();
        let object = Rc::new(object);
        self.trail.defer_destroy(Rc::clone(&object) as Rc<dyn Any>);
        object
    }

    /// Array form of [`Solver::rev_alloc`].
    pub fn rev_alloc_array<T: 'static>(&mut self, objects: Vec<T>) -> Rc<Vec<T>> {
        self.check_alloc_state();
        let objects = Rc::new(objects);
        self.trail.defer_destroy(Rc::clone(&objects) as Rc<dyn Any>);
        objects
    }

    /// Hand an integer buffer to the trail; its storage is released when the
    /// trail unwinds past this point.
    pub fn defer_free_int_array(&mut self, array: Vec<i32>) {
        self.check_alloc_state();
        self.trail.defer_free_int_array(array);
    }

    pub fn defer_free_int64_array(&mut self, array: Vec<i64>) {
        self.check_alloc_state();
        self.trail.defer_free_int64_array(array);
    }

    pub fn defer_free_u64_array(&mut self, array: Vec<u64>) {
        self.check_alloc_state();
        self.trail.defer_free_u64_array(array);
    }

    fn check_alloc_state(&self) {
        kabocha_assert_simple!(
            self.status != SolverState::AtSolution,
            "allocating at a leaf node"
        );
    }
}

/// Demons and the propagation queue.
impl Solver {
    /// Register a demon; its priority is read once at registration.
    pub fn register_demon(&mut self, demon: Rc<dyn Demon>) -> DemonId {
        let priority = demon.priority();
        let stamp = self.memory.new_u64(0);
        let id = self.demons.push(DemonEntry {
            demon,
            priority,
            stamp,
        });
        if self.instruments_demons {
            self.trace_register_demon(id);
        }
        id
    }

    /// Semi-permanently suppress the demon by saturating its stamp; undone
    /// on backtrack past this point.
    pub fn inhibit_demon(&mut self, demon: DemonId) {
        let stamp = self.demons[demon].stamp;
        if self.memory.u64(stamp) < u64::MAX {
            self.save_and_set_u64(stamp, u64::MAX);
        }
    }

    pub fn desinhibit_demon(&mut self, demon: DemonId) {
        let stamp = self.demons[demon].stamp;
        if self.memory.u64(stamp) == u64::MAX {
            let new_stamp = self.queue.stamp - 1;
            self.save_and_set_u64(stamp, new_stamp);
        }
    }

    /// Enqueue the demon unless it is already scheduled in this cycle.
    pub fn enqueue_demon(&mut self, demon: DemonId) -> PropagationStatus {
        let stamp = self.demons[demon].stamp;
        if self.memory.u64(stamp) < self.queue.stamp {
            self.memory.write_u64(stamp, self.queue.stamp);
            let priority = self.demons[demon].priority;
            self.queue.push(priority, demon);
            if self.queue.freeze_level == 0 {
                self.process_queue()?;
            }
        }
        Ok(())
    }

    pub fn freeze_queue(&mut self) {
        self.queue.freeze();
    }

    pub fn unfreeze_queue(&mut self) -> PropagationStatus {
        if self.queue.unfreeze() {
            self.process_queue()?;
        }
        Ok(())
    }

    /// Drain the queue to fixpoint. NORMAL strictly before VAR, VAR strictly
    /// before DELAYED, and DELAYED one at a time so higher priority demons
    /// woken by it run first.
    pub(crate) fn process_queue(&mut self) -> PropagationStatus {
        if self.queue.in_process {
            return Ok(());
        }
        self.queue.in_process = true;
        let result = self.process_queue_loop();
        if result.is_ok() {
            self.queue.in_process = false;
        }
        result
    }

    fn process_queue_loop(&mut self) -> PropagationStatus {
        loop {
            while self.queue.has_pending(DemonPriority::Var)
                || self.queue.has_pending(DemonPriority::Normal)
            {
                while let Some(demon) = self.queue.pop(DemonPriority::Normal) {
                    self.run_demon(demon)?;
                }
                if let Some(demon) = self.queue.pop(DemonPriority::Var) {
                    self.run_demon(demon)?;
                }
            }
            match self.queue.pop(DemonPriority::Delayed) {
                Some(demon) => self.run_demon(demon)?,
                None => return Ok(()),
            }
        }
    }

    /// Drain only the NORMAL queue; variable modification code uses this to
    /// reach a bounds fixpoint without waking delayed work.
    pub fn process_normal_demons(&mut self) -> PropagationStatus {
        while let Some(demon) = self.queue.pop(DemonPriority::Normal) {
            self.run_demon(demon)?;
        }
        Ok(())
    }

    fn run_demon(&mut self, demon: DemonId) -> PropagationStatus {
        // Re-arm within the current cycle so the demon may re-enqueue itself.
        let stamp = self.demons[demon].stamp;
        let new_stamp = self.queue.stamp - 1;
        self.memory.write_u64(stamp, new_stamp);

        match self.demons[demon].priority {
            DemonPriority::Normal => self.statistics.num_normal_demon_runs += 1,
            DemonPriority::Var => self.statistics.num_var_demon_runs += 1,
            DemonPriority::Delayed => self.statistics.num_delayed_demon_runs += 1,
        }

        if self.instruments_demons {
            self.trace_begin_demon_run(demon);
        }
        let callback = Rc::clone(&self.demons[demon].demon);
        callback.run(self)?;
        if self.instruments_demons {
            self.trace_end_demon_run(demon);
        }
        Ok(())
    }

    /// Register the one-shot action run on the next failure.
    pub fn set_queue_action_on_fail(&mut self, action: Rc<dyn Action>) {
        self.queue.set_action_on_fail(action);
    }

    pub fn clear_queue_action_on_fail(&mut self) {
        self.queue.clear_action_on_fail();
    }

    /// Clean up the queue after a failure: discard pending demons, run the
    /// one-shot on-failure action, reset the posting machinery.
    pub(crate) fn queue_after_failure(&mut self) {
        self.queue.discard_pending_demons();
        if let Some(action) = self.queue.take_action_on_fail() {
            action.run(self);
        }
        self.queue.reset_after_failure();
    }
}

/// Constraint management.
impl Solver {
    /// Add a constraint to the model. Outside search it is recorded and
    /// posted by the next solve's initial propagation; during search it is
    /// posted (and initially propagated) immediately.
    pub fn add_constraint(&mut self, constraint: Rc<dyn Constraint>) -> PropagationStatus {
        match self.status {
            SolverState::InSearch => self.queue_add_constraint(constraint),
            SolverState::InRootNode => {
                // Remember which root constraint spawned this one, for the
                // nested initial propagation pass.
                let parent = if self.constraint_index < self.constraints.len() {
                    self.constraint_index
                } else {
                    self.additional_constraints
                        .get(self.additional_constraint_index)
                        .map(|(_, parent)| *parent)
                        .unwrap_or(0)
                };
                self.additional_constraints.push((constraint, parent));
                Ok(())
            }
            _ => {
                self.constraints.push(constraint);
                Ok(())
            }
        }
    }

    /// Add a cast constraint linking `target_var` to `expression`; the name
    /// of the target is synthesised from the expression when asked for.
    pub fn add_cast_constraint(
        &mut self,
        constraint: Rc<dyn Constraint>,
        target_var: IntVar,
        expression: IntVar,
    ) -> PropagationStatus {
        if self.status != SolverState::InSearch {
            let _ = self.cast_information.insert(
                target_var,
                CastInfo {
                    expression,
                    constraint: Rc::clone(&constraint),
                },
            );
        }
        self.add_constraint(constraint)
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Freeze, post, run initial propagation, unfreeze.
    pub fn post_and_propagate(&mut self, constraint: &Rc<dyn Constraint>) -> PropagationStatus {
        self.freeze_queue();
        Rc::clone(constraint).post(self)?;
        constraint.initial_propagate(self)?;
        self.unfreeze_queue()
    }

    fn queue_add_constraint(&mut self, constraint: Rc<dyn Constraint>) -> PropagationStatus {
        self.queue.to_add.push(constraint);
        self.process_pending_constraints()
    }

    /// Post pending constraints in FIFO order; posting may append further
    /// constraints which are picked up by the same loop.
    fn process_pending_constraints(&mut self) -> PropagationStatus {
        if self.queue.in_add {
            return Ok(());
        }
        self.queue.in_add = true;
        let mut index = 0;
        while index < self.queue.to_add.len() {
            let constraint = Rc::clone(&self.queue.to_add[index]);
            self.post_and_propagate(&constraint)?;
            index += 1;
        }
        self.queue.in_add = false;
        self.queue.to_add.clear();
        Ok(())
    }

    /// Initial propagation of the whole model: every root constraint, then
    /// every constraint added while the root constraints were propagating.
    fn process_constraints(&mut self) -> PropagationStatus {
        self.additional_constraints.clear();
        self.additional_constraint_index = 0;

        let constraints_size = self.constraints.len();
        self.constraint_index = 0;
        while self.constraint_index < constraints_size {
            let constraint = Rc::clone(&self.constraints[self.constraint_index]);
            self.trace_begin_constraint_initial_propagation(&constraint);
            self.post_and_propagate(&constraint)?;
            self.trace_end_constraint_initial_propagation(&constraint);
            self.constraint_index += 1;
        }
        kabocha_assert_eq_simple!(self.constraints.len(), constraints_size);

        while self.additional_constraint_index < self.additional_constraints.len() {
            let (nested, parent_index) = {
                let (constraint, parent) =
                    &self.additional_constraints[self.additional_constraint_index];
                (Rc::clone(constraint), *parent)
            };
            let parent = Rc::clone(&self.constraints[parent_index]);
            self.trace_begin_nested_constraint_initial_propagation(&parent, &nested);
            self.post_and_propagate(&nested)?;
            self.trace_end_nested_constraint_initial_propagation(&parent, &nested);
            self.additional_constraint_index += 1;
        }
        Ok(())
    }
}

/// Failure handling.
impl Solver {
    /// Record a failure: count it, notify the monitors, and hand back the
    /// token the caller must propagate to the search loop.
    pub fn fail(&mut self) -> Failure {
        if let Some(intercept) = self.fail_intercept.clone() {
            intercept.run(self);
            return Failure;
        }
        debug!("fail");
        self.statistics.num_fails += 1;
        self.notify_begin_fail();
        if matches!(
            self.status,
            SolverState::OutsideSearch
                | SolverState::AtSolution
                | SolverState::NoMoreSolutions
                | SolverState::ProblemInfeasible
        ) {
            // A failure with no search loop to catch it: poison the model so
            // the next solve reports infeasibility instead of crashing.
            warn!("failure outside of search");
            self.constraints
                .push(Rc::new(FalseConstraint::new("failure outside of search")));
        }
        Failure
    }

    /// Install a hook that intercepts `fail` entirely; used by local-search
    /// style clients that handle failure themselves.
    pub fn set_fail_intercept(&mut self, intercept: Rc<dyn Action>) {
        self.fail_intercept = Some(intercept);
    }

    pub fn clear_fail_intercept(&mut self) {
        self.fail_intercept = None;
    }

    /// Register an action run on every failure from now until the trail
    /// unwinds past this point.
    pub fn add_fail_hook(&mut self, action: Rc<dyn Action>) {
        let live = self.memory.int64(self.fail_hooks_len) as usize;
        // Entries beyond the reversible length are stale leftovers from an
        // undone branch.
        self.fail_hooks.truncate(live);
        self.fail_hooks.push(action);
        let key = self.fail_hooks_len;
        self.save_and_set_int64(key, live as i64 + 1);
    }

    fn call_fail_hooks(&mut self) {
        let live = self.memory.int64(self.fail_hooks_len) as usize;
        for index in 0..live.min(self.fail_hooks.len()) {
            let hook = Rc::clone(&self.fail_hooks[index]);
            hook.run(self);
        }
    }
}

/// Markers and backtracking.
impl Solver {
    /// Push a plain marker; popped by the matching [`Solver::pop_state`].
    pub fn push_state(&mut self) {
        self.push_marker(MarkerKind::Simple);
    }

    pub fn pop_state(&mut self) {
        let kind = self.pop_marker();
        kabocha_assert_simple!(
            matches!(kind, MarkerKind::Simple),
            "pop_state() popped a non-simple marker"
        );
    }

    /// Register an action run when the search unwinds past this point. With
    /// `fast` set the marker skips the trail snapshot; only legal when
    /// nothing between the push and the pop touches the trail.
    pub fn add_backtrack_action(&mut self, action: Rc<dyn Action>, fast: bool) {
        self.push_marker(MarkerKind::ReversibleAction { action, fast });
    }

    pub(crate) fn push_marker(&mut self, kind: MarkerKind) {
        let mark = if matches!(kind, MarkerKind::ReversibleAction { fast: true, .. }) {
            Default::default()
        } else {
            self.trail.mark()
        };
        self.active_search_mut()
            .marker_stack
            .push(StateMarker { kind, mark });
        self.queue.increase_stamp();
    }

    pub(crate) fn pop_marker(&mut self) -> MarkerKind {
        let marker = self
            .active_search_mut()
            .marker_stack
            .pop()
            .expect("pop_state() on an empty marker stack");
        if marker.restores_trail() {
            self.trail.backtrack_to(&mut self.memory, marker.mark);
        }
        self.queue.increase_stamp();
        marker.kind
    }

    pub(crate) fn push_sentinel(&mut self, code: SentinelCode) {
        self.push_marker(MarkerKind::Sentinel(code));
        // The constructor sentinel is not counted.
        if code != SentinelCode::SolverCtor {
            self.active_search_mut().sentinel_pushed += 1;
        }
        let pushed = self.active_search().sentinel_pushed;
        kabocha_assert_moderate!(
            code == SentinelCode::SolverCtor
                || (code == SentinelCode::InitialSearch && pushed == 1)
                || (code == SentinelCode::RootNode && pushed == 2)
        );
    }

    /// Pop markers, running every reversible action, until the sentinel with
    /// the matching code has been popped. The solver state is left for the
    /// caller to manage.
    pub(crate) fn backtrack_to_sentinel(&mut self, code: SentinelCode) {
        let mut end_loop = self.active_search().sentinel_pushed == 0;
        while !end_loop {
            match self.pop_marker() {
                MarkerKind::Sentinel(popped) => {
                    let search = self.active_search_mut();
                    search.sentinel_pushed -= 1;
                    kabocha_assert_simple!(search.sentinel_pushed >= 0, "wrong sentinel found");
                    search.search_depth = 0;
                    search.left_search_depth = 0;
                    if popped == code {
                        end_loop = true;
                    }
                }
                MarkerKind::Simple | MarkerKind::ChoicePoint { .. } => {}
                MarkerKind::ReversibleAction { action, .. } => action.run(self),
            }
        }
        self.fail_stamp += 1;
    }

    /// Backtrack to the last open right branch. Returns the decision whose
    /// right branch must now be tried, or `None` when the tree is exhausted.
    fn backtrack_one_level(&mut self) -> (bool, Option<Rc<dyn Decision>>) {
        let mut no_more_solutions = false;
        let mut fail_decision = None;
        let mut end_loop = false;
        while !end_loop {
            match self.pop_marker() {
                MarkerKind::Sentinel(code) => {
                    kabocha_assert_simple!(
                        (code == SentinelCode::RootNode && self.solve_depth() == 1)
                            || (code == SentinelCode::InitialSearch && self.solve_depth() > 1),
                        "wrong sentinel found"
                    );
                    self.active_search_mut().sentinel_pushed -= 1;
                    no_more_solutions = true;
                    end_loop = true;
                }
                MarkerKind::Simple => {
                    warn!("simple markers should not be encountered during search");
                }
                MarkerKind::ChoicePoint {
                    decision,
                    right_branch,
                    depth,
                    left_depth,
                } => {
                    if !right_branch {
                        let search = self.active_search_mut();
                        search.search_depth = depth;
                        search.left_search_depth = left_depth;
                        fail_decision = Some(decision);
                        end_loop = true;
                    }
                }
                MarkerKind::ReversibleAction { action, .. } => action.run(self),
            }
        }
        self.notify_end_fail();
        self.call_fail_hooks();
        self.fail_stamp += 1;
        if no_more_solutions {
            self.notify_no_more_solutions();
        }
        (no_more_solutions, fail_decision)
    }

    /// Close the current nested search without undoing its work: reversible
    /// action markers migrate to the parent search (their deferred undos are
    /// still owed), everything else is dropped silently.
    fn jump_to_sentinel_when_nested(&mut self) {
        kabocha_assert_simple!(
            self.solve_depth() > 1,
            "calling jump_to_sentinel from the top level"
        );
        let child_index = self.searches.len() - 1;
        let (parents, children) = self.searches.split_at_mut(child_index);
        let parent = &mut parents[child_index - 1];
        let child = &mut children[0];

        let mut found = false;
        while let Some(marker) = child.marker_stack.pop() {
            match marker.kind {
                MarkerKind::ReversibleAction { .. } => parent.marker_stack.push(marker),
                MarkerKind::Sentinel(_) => {
                    kabocha_assert_simple!(
                        child.marker_stack.is_empty(),
                        "sentinel found too early"
                    );
                    found = true;
                }
                MarkerKind::Simple | MarkerKind::ChoicePoint { .. } => {}
            }
        }
        child.search_depth = 0;
        child.left_search_depth = 0;
        kabocha_assert_simple!(found, "sentinel not found");
    }
}

/// Search control: the public search API.
impl Solver {
    /// Open a new top-level search. Fatal when called while a search is
    /// already open; use [`Solver::nested_solve`] inside search.
    pub fn new_search(
        &mut self,
        decision_builder: Rc<dyn DecisionBuilder>,
        monitors: Vec<Rc<dyn SearchMonitor>>,
    ) {
        assert!(
            !matches!(
                self.status,
                SolverState::InSearch | SolverState::InRootNode
            ),
            "use nested_solve() inside search"
        );
        self.backtrack_to_sentinel(SentinelCode::InitialSearch);
        self.status = SolverState::OutsideSearch;
        self.active_search_mut().created_by_solve = false;

        self.install_search_monitors(&decision_builder, monitors);

        self.notify_enter_search();

        kabocha_assert_eq_simple!(2, self.searches.len());
        self.push_sentinel(SentinelCode::InitialSearch);
        self.active_search_mut().decision_builder = Some(decision_builder);
    }

    fn install_search_monitors(
        &mut self,
        decision_builder: &Rc<dyn DecisionBuilder>,
        monitors: Vec<Rc<dyn SearchMonitor>>,
    ) {
        for monitor in monitors {
            self.install_monitor(monitor);
        }
        let mut extras = Vec::new();
        decision_builder.append_monitors(self, &mut extras);
        for monitor in extras {
            self.install_monitor(monitor);
        }
        // The print trace is installed last so it observes the propagation
        // of every other monitor.
        if let Some(print_trace) = self.print_trace.clone() {
            self.install_monitor(print_trace);
        }
    }

    /// Search for the next solution in the tree. Returns true when a leaf
    /// was accepted; the solver is then [`SolverState::AtSolution`] and the
    /// next call resumes behind that leaf.
    pub fn next_solution(&mut self) -> bool {
        let solve_depth = self.solve_depth();
        let top_level = solve_depth <= 1;
        let mut fail_decision: Option<Rc<dyn Decision>> = None;

        if solve_depth == 0 && self.active_search().decision_builder.is_none() {
            warn!("next_solution() called without a new_search before");
            return false;
        }

        if top_level {
            match self.status {
                SolverState::ProblemInfeasible | SolverState::NoMoreSolutions => return false,
                SolverState::AtSolution => {
                    let (no_more_solutions, decision) = self.backtrack_one_level();
                    if no_more_solutions {
                        self.status = SolverState::NoMoreSolutions;
                        return false;
                    }
                    fail_decision = decision;
                    self.status = SolverState::InSearch;
                }
                SolverState::OutsideSearch => {
                    self.status = SolverState::InRootNode;
                    self.notify_begin_initial_propagation();
                    match self.initial_propagation_body() {
                        Ok(()) => self.status = SolverState::InSearch,
                        Err(Failure) => {
                            self.queue_after_failure();
                            self.backtrack_to_sentinel(SentinelCode::InitialSearch);
                            self.status = SolverState::ProblemInfeasible;
                            return false;
                        }
                    }
                }
                // Usually after a restart_search.
                SolverState::InSearch => {}
                SolverState::InRootNode => unreachable!("next_solution() inside the root node"),
            }
        }

        let decision_builder = Rc::clone(
            self.active_search()
                .decision_builder
                .as_ref()
                .expect("a search must have a decision builder"),
        );

        let mut result = false;
        loop {
            match self.search_body(&mut fail_decision, &decision_builder) {
                Ok(found) => {
                    result = found;
                    break;
                }
                Err(Failure) => {
                    self.queue_after_failure();
                    let sentinel = if top_level {
                        SentinelCode::RootNode
                    } else {
                        SentinelCode::InitialSearch
                    };
                    if self.active_search().should_finish {
                        fail_decision = None;
                        self.backtrack_to_sentinel(sentinel);
                        let search = self.active_search_mut();
                        search.should_finish = false;
                        search.should_restart = false;
                        // No need to push the sentinel back: we are exiting.
                        result = false;
                        break;
                    } else if self.active_search().should_restart {
                        fail_decision = None;
                        self.backtrack_to_sentinel(sentinel);
                        let search = self.active_search_mut();
                        search.should_finish = false;
                        search.should_restart = false;
                        self.push_sentinel(sentinel);
                        self.statistics.num_restarts += 1;
                        self.notify_restart_search();
                    } else {
                        let (no_more_solutions, decision) = self.backtrack_one_level();
                        fail_decision = decision;
                        if no_more_solutions {
                            result = false;
                            break;
                        }
                    }
                }
            }
        }
        if top_level {
            self.status = if result {
                SolverState::AtSolution
            } else {
                SolverState::NoMoreSolutions
            };
        }
        result
    }

    fn initial_propagation_body(&mut self) -> PropagationStatus {
        self.process_constraints()?;
        self.notify_end_initial_propagation();
        self.push_sentinel(SentinelCode::RootNode);
        Ok(())
    }

    /// One protected region of the search loop: refute the pending decision
    /// if any, then descend until a leaf.
    fn search_body(
        &mut self,
        fail_decision: &mut Option<Rc<dyn Decision>>,
        decision_builder: &Rc<dyn DecisionBuilder>,
    ) -> Result<bool, Failure> {
        if let Some(decision) = fail_decision.take() {
            let depth = self.active_search().search_depth;
            let left_depth = self.active_search().left_search_depth;
            self.push_marker(MarkerKind::ChoicePoint {
                decision: Rc::clone(&decision),
                right_branch: true,
                depth,
                left_depth,
            });
            self.notify_refute_decision(&decision)?;
            self.statistics.num_branches += 1;
            decision.refute(self)?;
            self.notify_after_decision(&decision, false)?;
            self.active_search_mut().right_move();
        }

        loop {
            self.notify_begin_next_decision(decision_builder)?;
            let next = decision_builder.next(self)?;
            self.notify_end_next_decision(decision_builder, next.as_ref())?;

            let mut decision = match next {
                Some(decision) => decision,
                None => break,
            };

            match self.modify_decision(&decision) {
                modification @ (DecisionModification::NoChange
                | DecisionModification::SwitchBranches) => {
                    if modification == DecisionModification::SwitchBranches {
                        decision = Rc::new(ReverseDecision::new(decision));
                    }
                    self.statistics.num_decisions += 1;
                    let depth = self.active_search().search_depth;
                    let left_depth = self.active_search().left_search_depth;
                    self.push_marker(MarkerKind::ChoicePoint {
                        decision: Rc::clone(&decision),
                        right_branch: false,
                        depth,
                        left_depth,
                    });
                    self.notify_apply_decision(&decision)?;
                    self.statistics.num_branches += 1;
                    decision.apply(self)?;
                    self.notify_after_decision(&decision, true)?;
                    self.active_search_mut().left_move();
                }
                DecisionModification::KeepLeft => {
                    self.notify_apply_decision(&decision)?;
                    decision.apply(self)?;
                    self.notify_after_decision(&decision, true)?;
                }
                DecisionModification::KeepRight => {
                    self.notify_refute_decision(&decision)?;
                    decision.refute(self)?;
                    self.notify_after_decision(&decision, false)?;
                }
                DecisionModification::KillBoth => return Err(self.fail()),
            }
        }

        if self.accept_solution() {
            self.active_search_mut().solution_counter += 1;
            self.statistics.num_solutions += 1;
            if !self.at_solution() || !self.currently_in_solve() {
                Ok(true)
            } else {
                // Some monitor wants further solutions and we are inside
                // solve: fail to keep enumerating.
                Err(self.fail())
            }
        } else {
            Err(self.fail())
        }
    }

    fn modify_decision(&mut self, decision: &Rc<dyn Decision>) -> DecisionModification {
        match self.active_search().branch_selector.clone() {
            Some(selector) => selector.select(self, decision),
            None => DecisionModification::NoChange,
        }
    }

    /// Tear down the current top-level search.
    pub fn end_search(&mut self) {
        kabocha_assert_eq_simple!(2, self.searches.len());
        self.backtrack_to_sentinel(SentinelCode::InitialSearch);
        self.notify_exit_search();
        self.active_search_mut().clear();
        self.status = SolverState::OutsideSearch;
    }

    /// new_search + next_solution + end_search; returns whether a solution
    /// was found. Monitors returning true from `at_solution` make the search
    /// enumerate the whole tree before returning.
    pub fn solve(
        &mut self,
        decision_builder: Rc<dyn DecisionBuilder>,
        monitors: Vec<Rc<dyn SearchMonitor>>,
    ) -> bool {
        self.new_search(decision_builder, monitors);
        self.active_search_mut().created_by_solve = true;
        let _ = self.next_solution();
        let solution_found = self.active_search().solution_counter > 0;
        self.end_search();
        solution_found
    }

    /// Restart the current search from its root.
    pub fn restart_search(&mut self) {
        kabocha_assert_simple!(self.active_search().sentinel_pushed != 0);
        if self.solve_depth() == 1 {
            if self.active_search().sentinel_pushed > 1 {
                self.backtrack_to_sentinel(SentinelCode::RootNode);
            }
            kabocha_assert_eq_simple!(1, self.active_search().sentinel_pushed);
            self.push_sentinel(SentinelCode::RootNode);
            self.status = SolverState::InSearch;
        } else {
            kabocha_assert_eq_simple!(SolverState::InSearch, self.status);
            if self.active_search().sentinel_pushed > 0 {
                self.backtrack_to_sentinel(SentinelCode::InitialSearch);
            }
            kabocha_assert_eq_simple!(0, self.active_search().sentinel_pushed);
            self.push_sentinel(SentinelCode::InitialSearch);
        }
        self.statistics.num_restarts += 1;
        self.notify_restart_search();
    }

    /// Run a search nested under the current node. With `restore` the work
    /// of a successful nested search is undone before returning; otherwise
    /// the nested search's domain reductions are kept and only its deferred
    /// undo actions migrate to the parent search.
    pub fn nested_solve(
        &mut self,
        decision_builder: Rc<dyn DecisionBuilder>,
        restore: bool,
        monitors: Vec<Rc<dyn SearchMonitor>>,
    ) -> bool {
        self.searches.push(Search::new());
        self.install_search_monitors(&decision_builder, monitors);
        self.active_search_mut().created_by_solve = true;
        self.notify_enter_search();
        self.push_sentinel(SentinelCode::InitialSearch);
        self.active_search_mut().decision_builder = Some(decision_builder);

        let result = self.next_solution();
        if result {
            if restore {
                self.backtrack_to_sentinel(SentinelCode::InitialSearch);
            } else {
                self.jump_to_sentinel_when_nested();
            }
        }
        self.notify_exit_search();
        self.active_search_mut().clear();
        let _ = self.searches.pop();
        result
    }

    /// Check whether `assignment` is feasible against the model, without
    /// opening a search.
    pub fn check_assignment(&mut self, assignment: &Assignment) -> bool {
        assert!(
            !matches!(
                self.status,
                SolverState::InSearch | SolverState::InRootNode
            ),
            "use nested_solve() inside search"
        );
        self.backtrack_to_sentinel(SentinelCode::InitialSearch);
        self.status = SolverState::OutsideSearch;
        self.active_search_mut().created_by_solve = false;

        self.notify_enter_search();
        kabocha_assert_eq_simple!(2, self.searches.len());
        self.push_sentinel(SentinelCode::InitialSearch);
        self.notify_begin_initial_propagation();
        self.status = SolverState::InRootNode;
        self.constraint_index = 0;
        self.additional_constraint_index = 0;

        match self.check_assignment_body(assignment) {
            Ok(()) => {
                self.notify_end_initial_propagation();
                self.backtrack_to_sentinel(SentinelCode::InitialSearch);
                self.status = SolverState::OutsideSearch;
                true
            }
            Err(Failure) => {
                let failing = if self.constraint_index < self.constraints.len() {
                    self.constraints.get(self.constraint_index)
                } else {
                    self.additional_constraints
                        .get(self.additional_constraint_index)
                        .and_then(|(_, parent)| self.constraints.get(*parent))
                };
                if let Some(failing) = failing {
                    debug!("failing constraint = {}", failing.debug_string());
                }
                self.queue_after_failure();
                self.backtrack_to_sentinel(SentinelCode::InitialSearch);
                self.status = SolverState::ProblemInfeasible;
                false
            }
        }
    }

    fn check_assignment_body(&mut self, assignment: &Assignment) -> PropagationStatus {
        for (var, value) in assignment.iter() {
            self.set_value(var, value)?;
        }
        self.process_constraints()
    }

    /// Check whether a constraint is consistent with the current model by
    /// solving a search whose only step posts it.
    pub fn check_constraint(&mut self, constraint: Rc<dyn Constraint>) -> bool {
        self.solve(
            Rc::new(crate::branching::ConstraintAdder::new(constraint)),
            Vec::new(),
        )
    }
}

/// Monitor dispatch: every event is sent to each monitor of the active
/// search; hooks that allow cancellation check the control flags afterwards.
impl Solver {
    fn check_fail(&mut self) -> PropagationStatus {
        let search = self.active_search();
        if search.should_finish || search.should_restart {
            return Err(self.fail());
        }
        Ok(())
    }

    fn notify_enter_search(&mut self) {
        // The solution counter is reset when entering the search, not when
        // leaving it, so the count stays observable after the search ends.
        self.active_search_mut().solution_counter = 0;
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.enter_search(self);
        }
    }

    fn notify_restart_search(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.restart_search(self);
        }
    }

    fn notify_exit_search(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.exit_search(self);
        }
    }

    fn notify_begin_next_decision(
        &mut self,
        builder: &Rc<dyn DecisionBuilder>,
    ) -> PropagationStatus {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.begin_next_decision(self, builder);
        }
        self.check_fail()
    }

    fn notify_end_next_decision(
        &mut self,
        builder: &Rc<dyn DecisionBuilder>,
        decision: Option<&Rc<dyn Decision>>,
    ) -> PropagationStatus {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.end_next_decision(self, builder, decision);
        }
        self.check_fail()
    }

    fn notify_apply_decision(&mut self, decision: &Rc<dyn Decision>) -> PropagationStatus {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.apply_decision(self, decision);
        }
        self.check_fail()
    }

    fn notify_refute_decision(&mut self, decision: &Rc<dyn Decision>) -> PropagationStatus {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.refute_decision(self, decision);
        }
        self.check_fail()
    }

    fn notify_after_decision(
        &mut self,
        decision: &Rc<dyn Decision>,
        apply: bool,
    ) -> PropagationStatus {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.after_decision(self, decision, apply);
        }
        self.check_fail()
    }

    fn notify_begin_fail(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.begin_fail(self);
        }
    }

    fn notify_end_fail(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.end_fail(self);
        }
    }

    fn notify_begin_initial_propagation(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.begin_initial_propagation(self);
        }
    }

    fn notify_end_initial_propagation(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.end_initial_propagation(self);
        }
    }

    /// All-or-nothing conjunction; every monitor is queried even after the
    /// first rejection because each deserves to observe the solution.
    fn accept_solution(&mut self) -> bool {
        let mut valid = true;
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            if !monitor.accept_solution(self) {
                valid = false;
            }
        }
        valid
    }

    /// Disjunction: true when any monitor asks to continue; every monitor is
    /// queried regardless.
    fn at_solution(&mut self) -> bool {
        let mut should_continue = false;
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            if monitor.at_solution(self) {
                should_continue = true;
            }
        }
        should_continue
    }

    fn notify_no_more_solutions(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.no_more_solutions(self);
        }
    }

    pub fn local_optimum(&mut self) -> bool {
        let mut result = false;
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            if monitor.local_optimum(self) {
                result = true;
            }
        }
        result
    }

    pub fn accept_delta(&mut self) -> bool {
        let mut accept = true;
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            if !monitor.accept_delta(self) {
                accept = false;
            }
        }
        accept
    }

    pub fn accept_neighbor(&mut self) {
        for index in 0..self.active_search().monitors.len() {
            let monitor = Rc::clone(&self.active_search().monitors[index]);
            monitor.accept_neighbor(self);
        }
    }

    /// Periodic housekeeping on the top-level search's monitors.
    pub fn top_periodic_check(&mut self) {
        for index in 0..self.searches[1].monitors.len() {
            let monitor = Rc::clone(&self.searches[1].monitors[index]);
            monitor.periodic_check(self);
        }
    }

    /// The maximum progress estimate over the top-level search's monitors.
    pub fn top_progress_percent(&mut self) -> i32 {
        let mut progress = NO_PROGRESS;
        for index in 0..self.searches[1].monitors.len() {
            let monitor = Rc::clone(&self.searches[1].monitors[index]);
            progress = progress.max(monitor.progress_percent(self));
        }
        progress
    }
}

/// Propagation event fan-out to the registered propagation monitors.
impl Solver {
    pub(crate) fn trace_register_demon(&mut self, demon: DemonId) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).register_demon(self, demon);
        }
    }

    pub(crate) fn trace_begin_demon_run(&mut self, demon: DemonId) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).begin_demon_run(self, demon);
        }
    }

    pub(crate) fn trace_end_demon_run(&mut self, demon: DemonId) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).end_demon_run(self, demon);
        }
    }

    fn trace_begin_constraint_initial_propagation(&mut self, constraint: &Rc<dyn Constraint>) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace
                .get(index)
                .begin_constraint_initial_propagation(self, constraint);
        }
    }

    fn trace_end_constraint_initial_propagation(&mut self, constraint: &Rc<dyn Constraint>) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace
                .get(index)
                .end_constraint_initial_propagation(self, constraint);
        }
    }

    fn trace_begin_nested_constraint_initial_propagation(
        &mut self,
        parent: &Rc<dyn Constraint>,
        nested: &Rc<dyn Constraint>,
    ) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace
                .get(index)
                .begin_nested_constraint_initial_propagation(self, parent, nested);
        }
    }

    fn trace_end_nested_constraint_initial_propagation(
        &mut self,
        parent: &Rc<dyn Constraint>,
        nested: &Rc<dyn Constraint>,
    ) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace
                .get(index)
                .end_nested_constraint_initial_propagation(self, parent, nested);
        }
    }

    /// Announce a named propagation context (typically a constraint) for the
    /// events that follow, until the matching [`Solver::pop_context`].
    pub fn push_context(&mut self, context: &str) {
        if !self.instruments_variables {
            return;
        }
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).push_context(self, context);
        }
    }

    pub fn pop_context(&mut self) {
        if !self.instruments_variables {
            return;
        }
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).pop_context(self);
        }
    }

    pub(crate) fn trace_set_min(&mut self, var: IntVar, new_min: i64) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).set_min(self, var, new_min);
        }
    }

    pub(crate) fn trace_set_max(&mut self, var: IntVar, new_max: i64) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).set_max(self, var, new_max);
        }
    }

    pub(crate) fn trace_set_range(&mut self, var: IntVar, new_min: i64, new_max: i64) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).set_range(self, var, new_min, new_max);
        }
    }

    pub(crate) fn trace_set_value(&mut self, var: IntVar, value: i64) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).set_value(self, var, value);
        }
    }

    pub(crate) fn trace_set_values(&mut self, var: IntVar, values: &[i64]) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).set_values(self, var, values);
        }
    }

    pub(crate) fn trace_remove_value(&mut self, var: IntVar, value: i64) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).remove_value(self, var, value);
        }
    }

    pub(crate) fn trace_remove_values(&mut self, var: IntVar, values: &[i64]) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace.get(index).remove_values(self, var, values);
        }
    }

    pub(crate) fn trace_remove_interval(
        &mut self,
        var: IntVar,
        interval_min: i64,
        interval_max: i64,
    ) {
        let trace = Rc::clone(&self.propagation_monitor);
        for index in 0..trace.len() {
            trace
                .get(index)
                .remove_interval(self, var, interval_min, interval_max);
        }
    }
}

/// Naming of propagation objects.
impl Solver {
    /// The object's name. Cast targets borrow the name of their expression;
    /// with `name_all_variables` set, anonymous variables are lazily given a
    /// minted name.
    pub fn object_name(&mut self, object: impl Into<PropagationObject>) -> String {
        let object = object.into();
        if let Some(name) = self.names.get_name(object) {
            return name.to_owned();
        }
        if let PropagationObject::Variable(var) = object {
            if let Some(cast) = self.cast_information.get(&var) {
                let expression = cast.expression;
                return format!("Var<{}>", self.object_name(expression));
            }
            if self.options.name_all_variables {
                let minted = format!("x_{}", self.anonymous_variable_index);
                self.anonymous_variable_index += 1;
                self.names.set_name(object, minted.clone());
                return minted;
            }
        }
        String::new()
    }

    pub fn set_object_name(&mut self, object: impl Into<PropagationObject>, name: impl Into<String>) {
        if self.options.store_names {
            self.names.set_name(object.into(), name.into());
        }
    }

    pub fn has_name(&self, object: impl Into<PropagationObject>) -> bool {
        let object = object.into();
        self.names.has_name(object)
            || (matches!(object, PropagationObject::Variable(_))
                && self.options.name_all_variables)
    }

    pub fn var_name(&mut self, var: IntVar) -> String {
        self.object_name(var)
    }

    pub(crate) fn set_var_name(&mut self, var: IntVar, name: String) {
        self.set_object_name(var, name);
    }
}

/// Model introspection.
impl Solver {
    pub fn accept(&self, visitor: &mut dyn ModelVisitor) {
        self.accept_with_monitors(visitor, &[]);
    }

    /// Walk the model: all constraints, then either the open search's
    /// monitors and decision builder or the given monitors.
    pub fn accept_with_monitors(
        &self,
        visitor: &mut dyn ModelVisitor,
        monitors: &[Rc<dyn SearchMonitor>],
    ) {
        visitor.begin_visit_model(&self.name);
        for constraint in &self.constraints {
            constraint.accept(visitor);
        }
        if self.status == SolverState::InRootNode {
            let search = self.top_level_search();
            for monitor in &search.monitors {
                monitor.accept(visitor);
            }
            if let Some(decision_builder) = &search.decision_builder {
                decision_builder.accept(visitor);
            }
        } else {
            for monitor in monitors {
                monitor.accept(visitor);
            }
        }
        visitor.end_visit_model(&self.name);
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Solver")
            .field("name", &self.name)
            .field("state", &self.status)
            .field("branches", &self.statistics.num_branches)
            .field("fails", &self.statistics.num_fails)
            .field("decisions", &self.statistics.num_decisions)
            .field("variables", &self.vars.len())
            .field("constraints", &self.constraints.len())
            .finish()
    }
}
