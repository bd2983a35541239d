use crate::create_statistics_struct;

create_statistics_struct!(
    /// The counters updated during propagation and search.
    SolverStatistics {
        /// The number of branches taken (left and right).
        num_branches: u64,
        /// The number of failures, including refuted leaves.
        num_fails: u64,
        /// The number of decisions produced by the decision builders.
        num_decisions: u64,
        /// The number of solutions found over the lifetime of the solver.
        num_solutions: u64,
        /// The number of times a search was restarted from its root.
        num_restarts: u64,
        /// The number of NORMAL priority demon runs.
        num_normal_demon_runs: u64,
        /// The number of VAR priority demon runs.
        num_var_demon_runs: u64,
        /// The number of DELAYED priority demon runs.
        num_delayed_demon_runs: u64,
});
