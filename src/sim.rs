//! Host simulation loop
//!
//! Stands in for the bare-metal `loop { sched.tick(&clock) }`: owns a
//! software clock, runs one slice per step and advances time between
//! slices. Used for testing and for trying out policy combinations off
//! target.

use log::info;

use crate::task::{Slice, Task, TaskResult};
use crate::timer::{Clock, SoftClock, Tick};

/// Driver for a root task (normally a scheduler)
pub struct SimLoop {
    /// Simulated time
    pub clock: SoftClock,
    stats: SimStats,
}

impl SimLoop {
    /// Loop starting at tick 0
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Loop starting at an arbitrary tick
    pub const fn starting_at(tick: Tick) -> Self {
        Self {
            clock: SoftClock::starting_at(tick),
            stats: SimStats::new(),
        }
    }

    /// Run one slice of `root`, then advance time by `advance` ticks
    pub fn step(&mut self, root: &mut dyn Task, advance: Tick) -> TaskResult {
        let slice = Slice::begin(&self.clock);
        let result = root.run(&slice);
        self.stats.record(result);
        self.clock.advance(advance);
        self.stats.elapsed = self.stats.elapsed.wrapping_add(advance);
        result
    }

    /// Step `root` every `step` ticks until `total` ticks have passed
    pub fn run_for(&mut self, root: &mut dyn Task, total: Tick, step: Tick) -> SimStats {
        let started = self.stats;
        let mut elapsed: Tick = 0;

        while elapsed < total {
            self.step(root, step);
            elapsed = elapsed.saturating_add(step.max(1));
        }

        let stats = self.stats.since(&started);
        info!(
            "sim: {} slices, {} run, {} continue, {} idle over {} ticks",
            stats.slices, stats.run, stats.run_continue, stats.not_run, stats.elapsed
        );
        stats
    }

    /// Totals since construction
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Current simulated tick
    pub fn now(&self) -> Tick {
        self.clock.now()
    }
}

impl Default for SimLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Slice outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Slices driven
    pub slices: u64,
    /// Slices reporting `Run`
    pub run: u64,
    /// Slices reporting `RunContinue`
    pub run_continue: u64,
    /// Slices reporting `NotRun`
    pub not_run: u64,
    /// Simulated ticks advanced
    pub elapsed: Tick,
}

impl SimStats {
    /// All counts zero
    pub const fn new() -> Self {
        Self {
            slices: 0,
            run: 0,
            run_continue: 0,
            not_run: 0,
            elapsed: 0,
        }
    }

    fn record(&mut self, result: TaskResult) {
        self.slices += 1;
        match result {
            TaskResult::NotRun => self.not_run += 1,
            TaskResult::RunContinue => self.run_continue += 1,
            TaskResult::Run => self.run += 1,
        }
    }

    fn since(&self, earlier: &SimStats) -> SimStats {
        SimStats {
            slices: self.slices - earlier.slices,
            run: self.run - earlier.run,
            run_continue: self.run_continue - earlier.run_continue,
            not_run: self.not_run - earlier.not_run,
            elapsed: self.elapsed.wrapping_sub(earlier.elapsed),
        }
    }

    /// Fraction of slices that did any work
    pub fn busy_ratio(&self) -> f32 {
        if self.slices == 0 {
            0.0
        } else {
            (self.run + self.run_continue) as f32 / self.slices as f32
        }
    }
}
