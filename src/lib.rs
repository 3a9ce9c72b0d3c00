//! coop-sched: cooperative slice scheduling for bare-metal control loops
//!
//! Run a fixed set of tasks from one main loop, no OS, no heap:
//! - Tasks report `NotRun` / `RunContinue` / `Run` and never block
//! - Schedulers compose a limit policy (how many tasks per slice) with an
//!   order policy (which slot first, round-robin, continuation)
//! - Schedulers are tasks, so they nest
//! - One-shot and cyclic timed tasks aligned to the slice tick
//! - Critical-section guarded ring buffers for task/ISR hand-off
//!
//! ```
//! use coop_sched::{SoftClock, TimedTask, TryAllScheduler, Slice};
//!
//! let clock = SoftClock::new();
//! let mut blink = TimedTask::cyclic(500, |_: &Slice<'_>| { /* toggle LED */ });
//! let mut sched = TryAllScheduler::<4>::default();
//! sched.register(&mut blink).ok();
//!
//! for _ in 0..3 {
//!     sched.tick(&clock);
//!     clock.advance(1);
//! }
//! ```

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod circular_buffer;
pub mod config;
pub mod critical;
pub mod limit;
pub mod order;
pub mod scheduler;
pub mod sim;
pub mod task;
pub mod timed;
pub mod timer;

#[cfg(test)]
mod fixtures;

pub use circular_buffer::{CircularBuffer, Ring};
pub use critical::{CriticalSection, Interrupts, Unguarded};
pub use limit::{Join, LimitPolicy, RunAllTasks, RunNTasks, RunNTasksTimed, RunOneTask, RunTasksTimed};
pub use order::{Continuable, FromFirst, OrderPolicy, RoundRobin};
pub use scheduler::{FromFirstSharedScheduler, RoundRobinSharedScheduler, TaskScheduler, TryAllScheduler};
pub use sim::{SimLoop, SimStats};
pub use task::{EnableableTask, FnTask, Slice, Task, TaskResult};
pub use timed::TimedTask;
pub use timer::{Clock, FnClock, MilliTimer, SoftClock, Tick};
#[cfg(feature = "std")]
pub use timer::StdClock;
