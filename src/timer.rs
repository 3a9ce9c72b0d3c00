//! Tick sources and restartable interval timers
//!
//! Time is a wrapping millisecond counter. On real hardware the counter is
//! bumped by SysTick (Cortex-M) or MTIME (RISC-V); for testing a software
//! counter is advanced by hand.
//!
//! All interval arithmetic is wrapping, so a timer armed just before the
//! counter overflows still expires after exactly `interval` ticks.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Millisecond tick count. Wraps after ~49.7 days.
pub type Tick = u32;

/// Anything that can tell the current tick.
pub trait Clock {
    /// Current tick count
    fn now(&self) -> Tick;
}

/// Tick counter incremented from a timer interrupt.
impl Clock for AtomicU32 {
    fn now(&self) -> Tick {
        self.load(Ordering::Relaxed)
    }
}

/// Software clock for testing and simulation
///
/// Interior mutability lets tasks holding a shared reference burn time
/// while they run.
#[derive(Debug, Default)]
pub struct SoftClock {
    ticks: Cell<Tick>,
}

impl SoftClock {
    /// Clock starting at tick 0
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock starting at an arbitrary tick (useful to test wraparound)
    pub const fn starting_at(tick: Tick) -> Self {
        Self { ticks: Cell::new(tick) }
    }

    /// Advance time by `ticks`, wrapping on overflow
    pub fn advance(&self, ticks: Tick) {
        self.ticks.set(self.ticks.get().wrapping_add(ticks));
    }

    /// Jump to an absolute tick
    pub fn set(&self, tick: Tick) {
        self.ticks.set(tick);
    }
}

impl Clock for SoftClock {
    fn now(&self) -> Tick {
        self.ticks.get()
    }
}

/// Adapter for a closure returning the current tick (e.g. a HAL call).
pub struct FnClock<F>(pub F);

impl<F: Fn() -> Tick> Clock for FnClock<F> {
    fn now(&self) -> Tick {
        (self.0)()
    }
}

/// Hosted clock: milliseconds since construction.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Clock reading 0 now
    pub fn new() -> Self {
        Self { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&self) -> Tick {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as Tick
    }
}

/// Restartable interval timer
///
/// Size: 12 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilliTimer {
    /// Tick the current interval began
    started_at: Tick,
    /// Interval length in ticks
    interval: Tick,
    /// Rearm automatically when `is_expired` reports expiry
    cyclic: bool,
}

impl MilliTimer {
    /// Timer armed at tick 0
    pub const fn new(interval: Tick, cyclic: bool) -> Self {
        Self {
            started_at: 0,
            interval,
            cyclic,
        }
    }

    /// Restart the interval from `now`
    pub fn reset(&mut self, now: Tick) {
        self.started_at = now;
    }

    /// Restart the interval as if it began at `tick`
    pub fn reset_at(&mut self, tick: Tick) {
        self.started_at = tick;
    }

    /// Has the interval elapsed at `now`? Never rearms.
    pub fn has_expired_without_reset(&self, now: Tick) -> bool {
        now.wrapping_sub(self.started_at) >= self.interval
    }

    /// Has the interval elapsed at `now`?
    ///
    /// A cyclic timer rearms from `now` when it reports expiry.
    pub fn is_expired(&mut self, now: Tick) -> bool {
        let expired = self.has_expired_without_reset(now);
        if expired && self.cyclic {
            self.started_at = now;
        }
        expired
    }

    /// Does `is_expired` rearm?
    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    /// Switch between one-shot and cyclic
    pub fn set_cyclic(&mut self, cyclic: bool) {
        self.cyclic = cyclic;
    }

    /// Tick at which the current interval began
    pub fn ticks_when_reset(&self) -> Tick {
        self.started_at
    }

    /// Interval length in ticks
    pub fn interval(&self) -> Tick {
        self.interval
    }

    /// Change the interval; the current start tick is kept
    pub fn set_interval(&mut self, interval: Tick) {
        self.interval = interval;
    }

    /// Ticks elapsed since the interval began
    pub fn interval_expired(&self, now: Tick) -> Tick {
        now.wrapping_sub(self.started_at)
    }

    /// Ticks until the interval ends (0 once expired)
    pub fn interval_left(&self, now: Tick) -> Tick {
        self.interval.saturating_sub(self.interval_expired(now))
    }

    /// Absolute tick at which the interval ends
    pub fn deadline(&self) -> Tick {
        self.started_at.wrapping_add(self.interval)
    }
}
