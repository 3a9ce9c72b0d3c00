//! Task model: the unit of cooperative work
//!
//! A task is anything that can run once and report what it did. Tasks
//! never block; a task that has more to do says so with
//! [`TaskResult::RunContinue`] and returns.
//!
//! Tasks are registered by `&mut` reference. The scheduler never owns,
//! copies or drops them.

use crate::timer::{Clock, Tick};

/// Outcome of one task invocation
///
/// Ordered `NotRun < RunContinue < Run`; a slice reports the maximum of its
/// task results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskResult {
    /// Did nothing
    #[default]
    NotRun,
    /// Did work, and wants to run again before anything else
    RunContinue,
    /// Did work, nothing left to continue
    Run,
}

impl TaskResult {
    /// Two-letter code for trace output
    pub const fn code(self) -> &'static str {
        match self {
            TaskResult::NotRun => "Nr",
            TaskResult::RunContinue => "Cn",
            TaskResult::Run => "Rn",
        }
    }

    /// Did the task do any work?
    pub fn did_work(self) -> bool {
        self != TaskResult::NotRun
    }
}

/// The scheduler's view of time for one slice
///
/// Every task run inside a slice sees the same `begin_tick`, so a batch of
/// timer checks agrees on "now".
#[derive(Clone, Copy)]
pub struct Slice<'c> {
    clock: &'c dyn Clock,
    begin_tick: Tick,
}

impl<'c> Slice<'c> {
    /// Open a slice at the clock's current tick
    pub fn begin(clock: &'c dyn Clock) -> Self {
        Self {
            clock,
            begin_tick: clock.now(),
        }
    }

    /// Tick at which this slice began
    pub fn begin_tick(&self) -> Tick {
        self.begin_tick
    }

    /// Current tick (moves while the slice runs)
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    /// Ticks spent in this slice so far
    pub fn elapsed(&self) -> Tick {
        self.now().wrapping_sub(self.begin_tick)
    }

    /// Clock driving this slice, for nested schedulers
    pub fn clock(&self) -> &'c dyn Clock {
        self.clock
    }
}

/// A unit of cooperative work
pub trait Task {
    /// Run once inside `slice`. Must not block.
    fn run(&mut self, slice: &Slice<'_>) -> TaskResult;
}

/// A task that can be switched off
///
/// A disabled task must return [`TaskResult::NotRun`] without side effects.
/// Each implementation enforces that itself.
pub trait EnableableTask: Task {
    /// Will the next `run` do anything?
    fn is_enabled(&self) -> bool;

    /// Switch the task on or off
    fn set_enabled(&mut self, enabled: bool);
}

/// Closure adapter
///
/// ```
/// use coop_sched::{FnTask, TaskResult};
/// let blink = FnTask::new(|_slice| TaskResult::Run);
/// ```
pub struct FnTask<F> {
    func: F,
    enabled: bool,
}

impl<F> FnTask<F>
where
    F: FnMut(&Slice<'_>) -> TaskResult,
{
    /// Enabled task calling `func` on every run
    pub const fn new(func: F) -> Self {
        Self { func, enabled: true }
    }

    /// Task that starts disabled
    pub const fn disabled(func: F) -> Self {
        Self { func, enabled: false }
    }
}

impl<F> Task for FnTask<F>
where
    F: FnMut(&Slice<'_>) -> TaskResult,
{
    fn run(&mut self, slice: &Slice<'_>) -> TaskResult {
        if !self.enabled {
            return TaskResult::NotRun;
        }
        (self.func)(slice)
    }
}

impl<F> EnableableTask for FnTask<F>
where
    F: FnMut(&Slice<'_>) -> TaskResult,
{
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
