//! Limit policies: when does a slice end?
//!
//! A limit policy is reset at the start of every slice and consulted after
//! every task execution. Its state never carries across slices.

use crate::config::DEFAULT_TASK_LIMIT;
use crate::task::TaskResult;
use crate::timer::{MilliTimer, Tick};

/// Slice termination strategy
pub trait LimitPolicy {
    /// Arm counters/timers for a new slice starting at `now`
    fn begin_slice(&mut self, now: Tick);

    /// Called after each task run; `true` ends the slice
    fn done_slice(&mut self, result: TaskResult, now: Tick) -> bool;
}

/// Visit every slot, every slice
#[derive(Debug, Clone, Copy, Default)]
pub struct RunAllTasks;

impl LimitPolicy for RunAllTasks {
    fn begin_slice(&mut self, _now: Tick) {}

    fn done_slice(&mut self, _result: TaskResult, _now: Tick) -> bool {
        false
    }
}

/// Stop at the first task that completes a unit of work
///
/// `RunContinue` and `NotRun` keep the slice going.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOneTask;

impl LimitPolicy for RunOneTask {
    fn begin_slice(&mut self, _now: Tick) {}

    fn done_slice(&mut self, result: TaskResult, _now: Tick) -> bool {
        result == TaskResult::Run
    }
}

/// Stop after `limit` tasks returned `Run`
///
/// Only completed work is counted; cheap `NotRun` checks are free.
#[derive(Debug, Clone, Copy)]
pub struct RunNTasks {
    limit: u8,
    remaining: u8,
}

impl RunNTasks {
    /// Allow `limit` completions per slice; 0 allows 256
    pub const fn new(limit: u8) -> Self {
        Self { limit, remaining: limit }
    }

    /// Takes effect from the next slice
    pub fn set_limit(&mut self, limit: u8) {
        self.limit = limit;
    }

    /// Configured completions per slice
    pub fn limit(&self) -> u8 {
        self.limit
    }

    /// Completions still allowed in the current slice
    pub fn remaining(&self) -> u8 {
        self.remaining
    }
}

impl Default for RunNTasks {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_LIMIT)
    }
}

impl LimitPolicy for RunNTasks {
    fn begin_slice(&mut self, _now: Tick) {
        self.remaining = self.limit;
    }

    fn done_slice(&mut self, result: TaskResult, _now: Tick) -> bool {
        if result < TaskResult::Run {
            return false;
        }
        // 8-bit counter: a limit of 0 wraps and allows 256 completions.
        self.remaining = self.remaining.wrapping_sub(1);
        self.remaining == 0
    }
}

/// Stop once the slice has used up its time budget
///
/// Task results are ignored. The check happens after each task, so a slice
/// always runs at least one populated slot.
#[derive(Debug, Clone, Copy)]
pub struct RunTasksTimed {
    timer: MilliTimer,
}

impl RunTasksTimed {
    /// Slices last at most `budget` ticks
    pub const fn new(budget: Tick) -> Self {
        Self {
            timer: MilliTimer::new(budget, false),
        }
    }

    /// Takes effect from the next slice
    pub fn set_budget(&mut self, budget: Tick) {
        self.timer.set_interval(budget);
    }

    /// Configured per-slice budget
    pub fn budget(&self) -> Tick {
        self.timer.interval()
    }

    /// Ticks left in the current slice's budget
    pub fn left(&self, now: Tick) -> Tick {
        self.timer.interval_left(now)
    }
}

impl Default for RunTasksTimed {
    /// Effectively unbounded
    fn default() -> Self {
        Self::new(Tick::MAX)
    }
}

impl LimitPolicy for RunTasksTimed {
    fn begin_slice(&mut self, now: Tick) {
        self.timer.reset(now);
    }

    fn done_slice(&mut self, _result: TaskResult, now: Tick) -> bool {
        self.timer.has_expired_without_reset(now)
    }
}

/// Two policies at once; whichever triggers first ends the slice
#[derive(Debug, Clone, Copy, Default)]
pub struct Join<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Join<A, B> {
    /// Join two policies
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: LimitPolicy, B: LimitPolicy> LimitPolicy for Join<A, B> {
    fn begin_slice(&mut self, now: Tick) {
        self.first.begin_slice(now);
        self.second.begin_slice(now);
    }

    fn done_slice(&mut self, result: TaskResult, now: Tick) -> bool {
        self.first.done_slice(result, now) || self.second.done_slice(result, now)
    }
}

/// Up to N completed tasks or a time budget, whichever comes first
pub type RunNTasksTimed = Join<RunNTasks, RunTasksTimed>;

impl RunNTasksTimed {
    /// `limit` completions or `budget` ticks
    pub const fn n_tasks_timed(limit: u8, budget: Tick) -> Self {
        Join::new(RunNTasks::new(limit), RunTasksTimed::new(budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: [TaskResult; 3] = [TaskResult::NotRun, TaskResult::RunContinue, TaskResult::Run];

    #[test]
    fn test_run_all_never_stops() {
        let mut limit = RunAllTasks;
        limit.begin_slice(0);
        for result in RESULTS {
            assert!(!limit.done_slice(result, 1_000_000));
        }
    }

    #[test]
    fn test_run_one_stops_on_run_only() {
        let mut limit = RunOneTask;
        limit.begin_slice(0);
        assert!(!limit.done_slice(TaskResult::NotRun, 0));
        assert!(!limit.done_slice(TaskResult::RunContinue, 0));
        assert!(limit.done_slice(TaskResult::Run, 0));
    }

    #[test]
    fn test_run_n_counts_completions() {
        let mut limit = RunNTasks::new(3);
        limit.begin_slice(0);
        assert!(!limit.done_slice(TaskResult::NotRun, 0));
        assert!(!limit.done_slice(TaskResult::RunContinue, 0));
        assert!(!limit.done_slice(TaskResult::Run, 0));
        assert!(!limit.done_slice(TaskResult::Run, 0));
        assert_eq!(limit.remaining(), 1);
        assert!(limit.done_slice(TaskResult::Run, 0));
    }

    #[test]
    fn test_run_n_rearms_each_slice() {
        let mut limit = RunNTasks::new(1);
        limit.begin_slice(0);
        assert!(limit.done_slice(TaskResult::Run, 0));
        limit.begin_slice(1);
        assert_eq!(limit.remaining(), 1);
        limit.set_limit(2);
        limit.begin_slice(2);
        assert!(!limit.done_slice(TaskResult::Run, 2));
        assert!(limit.done_slice(TaskResult::Run, 2));
    }

    #[test]
    fn test_run_n_default_and_zero_limit() {
        assert_eq!(RunNTasks::default().limit(), DEFAULT_TASK_LIMIT);

        let mut limit = RunNTasks::new(0);
        limit.begin_slice(0);
        for _ in 0..255 {
            assert!(!limit.done_slice(TaskResult::Run, 0));
        }
        assert!(limit.done_slice(TaskResult::Run, 0));
    }

    #[test]
    fn test_timed_ignores_result() {
        let mut limit = RunTasksTimed::new(50);
        limit.begin_slice(100);
        assert!(!limit.done_slice(TaskResult::Run, 149));
        assert_eq!(limit.left(120), 30);
        assert!(limit.done_slice(TaskResult::NotRun, 150));
    }

    #[test]
    fn test_timed_budget_restarts_per_slice() {
        let mut limit = RunTasksTimed::new(50);
        limit.begin_slice(0);
        assert!(limit.done_slice(TaskResult::NotRun, 60));
        limit.begin_slice(60);
        assert!(!limit.done_slice(TaskResult::NotRun, 100));
    }

    #[test]
    fn test_join_count_first() {
        let mut limit = RunNTasksTimed::n_tasks_timed(3, 50);
        limit.begin_slice(0);
        assert!(!limit.done_slice(TaskResult::Run, 10));
        assert!(!limit.done_slice(TaskResult::Run, 20));
        assert!(limit.done_slice(TaskResult::Run, 30));
    }

    #[test]
    fn test_join_time_first() {
        let mut limit = RunNTasksTimed::n_tasks_timed(3, 50);
        limit.begin_slice(0);
        assert!(!limit.done_slice(TaskResult::Run, 10));
        assert!(limit.done_slice(TaskResult::NotRun, 50));
    }
}
