use std::cell::RefCell;
use std::time::Duration;
use std::time::Instant;

use super::PropagationMonitor;
use super::SearchMonitor;
use crate::containers::HashMap;
use crate::engine::propagation::DemonId;
use crate::engine::Solver;
use crate::statistics::StatisticLogger;

#[derive(Default, Clone, Copy)]
struct DemonProfile {
    runs: u64,
    total_time: Duration,
}

/// Counts runs and accumulated run time per demon; installed automatically
/// when profiling is enabled and reported through the statistics sink at
/// `log_statistics`.
#[derive(Default)]
pub(crate) struct DemonProfiler {
    profiles: RefCell<HashMap<DemonId, DemonProfile>>,
    started: RefCell<Option<Instant>>,
}

impl DemonProfiler {
    pub(crate) fn log_statistics(&self, solver: &Solver, logger: &StatisticLogger) {
        let profiles = self.profiles.borrow();
        let mut entries: Vec<_> = profiles.iter().collect();
        entries.sort_by_key(|(demon, _)| **demon);
        for (demon, profile) in entries {
            logger.log_statistic(
                format!("demon_runs_{}", solver.demon_debug_string(*demon)),
                profile.runs,
            );
            logger.log_statistic(
                format!("demon_time_ms_{}", solver.demon_debug_string(*demon)),
                profile.total_time.as_millis(),
            );
        }
    }
}

impl SearchMonitor for DemonProfiler {}

impl PropagationMonitor for DemonProfiler {
    fn begin_demon_run(&self, _solver: &mut Solver, _demon: DemonId) {
        *self.started.borrow_mut() = Some(Instant::now());
    }

    fn end_demon_run(&self, _solver: &mut Solver, demon: DemonId) {
        let elapsed = self
            .started
            .borrow_mut()
            .take()
            .map(|start| start.elapsed())
            .unwrap_or_default();
        let mut profiles = self.profiles.borrow_mut();
        let profile = profiles.entry(demon).or_default();
        profile.runs += 1;
        profile.total_time += elapsed;
    }
}
