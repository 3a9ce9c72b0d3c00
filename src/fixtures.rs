//! Test tasks that record when they run

use core::cell::RefCell;
use std::vec::Vec;

use crate::task::{Slice, Task, TaskResult};
use crate::timer::Tick;

/// Order in which tasks ran
#[derive(Default)]
pub struct TraceLog {
    ids: RefCell<Vec<usize>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: usize) {
        self.ids.borrow_mut().push(id);
    }

    pub fn ids(&self) -> Vec<usize> {
        self.ids.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.ids.borrow_mut().clear();
    }
}

/// Always returns the same result
pub struct Probe<'l> {
    id: usize,
    result: TaskResult,
    log: &'l TraceLog,
}

impl<'l> Probe<'l> {
    pub fn new(id: usize, result: TaskResult, log: &'l TraceLog) -> Self {
        Self { id, result, log }
    }
}

impl Task for Probe<'_> {
    fn run(&mut self, _slice: &Slice<'_>) -> TaskResult {
        self.log.record(self.id);
        self.result
    }
}

/// Plays a fixed script of results, then `NotRun` forever
pub struct Scripted<'l> {
    id: usize,
    script: &'static [TaskResult],
    pos: usize,
    log: &'l TraceLog,
}

impl<'l> Scripted<'l> {
    pub fn new(id: usize, script: &'static [TaskResult], log: &'l TraceLog) -> Self {
        Self { id, script, pos: 0, log }
    }
}

impl Task for Scripted<'_> {
    fn run(&mut self, _slice: &Slice<'_>) -> TaskResult {
        self.log.record(self.id);
        let result = self.script.get(self.pos).copied().unwrap_or_default();
        self.pos += 1;
        result
    }
}

/// Alternates idle and busy windows of scripted lengths
///
/// Idle windows return `NotRun`. Busy windows return `RunContinue` until the
/// window closes, and `Run` on the call that closes it. An empty script, or
/// one starting with a zero-length window, disables the task.
pub struct Worker {
    windows: &'static [Tick],
    window: usize,
    busy: bool,
    /// Tick the current window opened
    opened_at: Tick,
}

impl Worker {
    pub fn new(windows: &'static [Tick]) -> Self {
        Self {
            windows,
            window: 0,
            busy: false,
            opened_at: 0,
        }
    }
}

impl Task for Worker {
    fn run(&mut self, slice: &Slice<'_>) -> TaskResult {
        if self.windows.first().copied().unwrap_or(0) == 0 {
            return TaskResult::NotRun;
        }

        let now = slice.begin_tick();
        if now.wrapping_sub(self.opened_at) < self.windows[self.window] {
            return if self.busy {
                TaskResult::RunContinue
            } else {
                TaskResult::NotRun
            };
        }

        let was_busy = self.busy;
        self.busy = !self.busy;
        self.window = (self.window + 1) % self.windows.len();
        self.opened_at = now;

        if was_busy {
            TaskResult::Run
        } else {
            TaskResult::NotRun
        }
    }
}
