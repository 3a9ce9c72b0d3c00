//! One-shot and cyclic timed tasks
//!
//! The firing decision is taken against the slice's begin tick, not the
//! clock at call time, so every timed task checked in one slice sees the
//! same instant.
//!
//! States:
//! - Waiting: enabled, deadline not reached
//! - Armed cyclic: enabled, rearms from the slice tick on every fire
//! - Dormant: disabled (spent one-shot, or stopped)

use log::debug;

use crate::task::{EnableableTask, Slice, Task, TaskResult};
use crate::timer::{MilliTimer, Tick};

/// Body type for a bare timing gate with nothing to run
pub type NoBody = fn(&Slice<'_>);

/// Timer-gated task
///
/// `body` runs whenever the gate fires. Tasks with their own `run` logic can
/// embed a `TimedTask<NoBody>` and call [`TimedTask::can_run`] first.
pub struct TimedTask<F = NoBody> {
    timer: MilliTimer,
    enabled: bool,
    body: Option<F>,
}

impl TimedTask<NoBody> {
    /// Timing gate without a body
    pub const fn gate(when: Tick, cyclic: bool, enabled: bool) -> Self {
        Self {
            timer: MilliTimer::new(when, cyclic),
            enabled,
            body: None,
        }
    }
}

impl<F> TimedTask<F>
where
    F: FnMut(&Slice<'_>),
{
    /// Timed task armed at tick 0, firing `when` ticks later
    pub const fn new(when: Tick, cyclic: bool, enabled: bool, body: F) -> Self {
        Self {
            timer: MilliTimer::new(when, cyclic),
            enabled,
            body: Some(body),
        }
    }

    /// Fires once, `after` ticks from tick 0, then goes dormant
    pub const fn one_shot(after: Tick, body: F) -> Self {
        Self::new(after, false, true, body)
    }

    /// Fires every `period` ticks
    pub const fn cyclic(period: Tick, body: F) -> Self {
        Self::new(period, true, true, body)
    }
}

impl<F> TimedTask<F> {
    /// Rearm so the interval begins at `tick`, and enable
    pub fn reset_at(&mut self, tick: Tick) {
        self.enabled = true;
        self.timer.reset_at(tick);
    }

    /// Gate check for this slice
    ///
    /// Returns `Run` when the timer has fired. A cyclic timer rearms from
    /// the slice begin tick; a one-shot disables itself.
    pub fn can_run(&mut self, slice: &Slice<'_>) -> TaskResult {
        if !self.enabled {
            // spent one-shot or stopped cyclic
            return TaskResult::NotRun;
        }

        let at = slice.begin_tick();
        if !self.timer.has_expired_without_reset(at) {
            return TaskResult::NotRun;
        }

        if self.timer.is_cyclic() {
            self.timer.reset_at(at);
        } else {
            self.enabled = false;
            debug!("one-shot fired @{}", at);
        }
        TaskResult::Run
    }

    /// Ticks spent waiting in the current interval
    pub fn interval_expired(&self, now: Tick) -> Tick {
        self.timer.interval_expired(now)
    }

    /// Ticks until the next fire
    pub fn interval_left(&self, now: Tick) -> Tick {
        self.timer.interval_left(now)
    }

    /// Tick the current interval began
    pub fn interval_began_at(&self) -> Tick {
        self.timer.ticks_when_reset()
    }

    /// Period (cyclic) or delay (one-shot)
    pub fn interval(&self) -> Tick {
        self.timer.interval()
    }

    /// Takes effect on the current interval
    pub fn set_interval(&mut self, interval: Tick) {
        self.timer.set_interval(interval);
    }

    /// Rearms after firing?
    pub fn is_cyclic(&self) -> bool {
        self.timer.is_cyclic()
    }

    /// Switch between one-shot and cyclic
    pub fn set_cyclic(&mut self, cyclic: bool) {
        self.timer.set_cyclic(cyclic);
    }

    /// Absolute tick of the next fire
    pub fn deadline(&self) -> Tick {
        self.timer.deadline()
    }
}

impl<F> Task for TimedTask<F>
where
    F: FnMut(&Slice<'_>),
{
    fn run(&mut self, slice: &Slice<'_>) -> TaskResult {
        let result = self.can_run(slice);
        if result == TaskResult::Run {
            if let Some(body) = self.body.as_mut() {
                body(slice);
            }
        }
        result
    }
}

impl<F> EnableableTask for TimedTask<F>
where
    F: FnMut(&Slice<'_>),
{
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SoftClock;
    use core::cell::Cell;

    fn run_at(task: &mut impl Task, tick: Tick) -> TaskResult {
        let clock = SoftClock::starting_at(tick);
        task.run(&Slice::begin(&clock))
    }

    #[test]
    fn test_cyclic_fires_and_rearms() {
        let mut task = TimedTask::gate(100, true, true);

        assert_eq!(run_at(&mut task, 99), TaskResult::NotRun);
        assert_eq!(run_at(&mut task, 100), TaskResult::Run);
        assert_eq!(task.deadline(), 200);
        assert_eq!(run_at(&mut task, 150), TaskResult::NotRun);
        assert!(task.is_enabled());
        assert_eq!(run_at(&mut task, 200), TaskResult::Run);
    }

    #[test]
    fn test_one_shot_goes_dormant() {
        let fired = Cell::new(0);
        let mut task = TimedTask::one_shot(50, |_: &Slice<'_>| fired.set(fired.get() + 1));

        assert_eq!(run_at(&mut task, 49), TaskResult::NotRun);
        assert_eq!(run_at(&mut task, 50), TaskResult::Run);
        assert!(!task.is_enabled());
        assert_eq!(run_at(&mut task, 500), TaskResult::NotRun);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_reset_at_revives_one_shot() {
        let mut task = TimedTask::gate(10, false, true);
        assert_eq!(run_at(&mut task, 10), TaskResult::Run);
        assert!(!task.is_enabled());

        task.reset_at(100);
        assert!(task.is_enabled());
        assert_eq!(run_at(&mut task, 105), TaskResult::NotRun);
        assert_eq!(run_at(&mut task, 110), TaskResult::Run);
    }

    #[test]
    fn test_disabled_never_fires() {
        let fired = Cell::new(false);
        let mut task = TimedTask::new(10, true, false, |_: &Slice<'_>| fired.set(true));
        assert_eq!(run_at(&mut task, 1000), TaskResult::NotRun);
        assert!(!fired.get());
    }

    #[test]
    fn test_fire_aligned_to_slice_begin() {
        let mut task = TimedTask::gate(100, true, true);
        let clock = SoftClock::starting_at(130);
        let slice = Slice::begin(&clock);
        clock.advance(40);

        assert_eq!(task.run(&slice), TaskResult::Run);
        assert_eq!(task.interval_began_at(), 130);
        assert_eq!(task.interval_left(170), 60);
        assert_eq!(task.interval_expired(170), 40);
    }

    #[test]
    fn test_cyclic_across_tick_wrap() {
        let mut task = TimedTask::gate(100, true, true);
        task.reset_at(Tick::MAX - 10);
        assert_eq!(run_at(&mut task, 50), TaskResult::NotRun);
        assert_eq!(run_at(&mut task, 89), TaskResult::Run);
    }

    #[test]
    fn test_accessors() {
        let mut task = TimedTask::gate(100, false, true);
        task.set_interval(250);
        task.set_cyclic(true);
        assert_eq!(task.interval(), 250);
        assert!(task.is_cyclic());
    }
}
