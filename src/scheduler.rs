//! Policy-composed cooperative scheduler
//!
//! A [`TaskScheduler`] is a fixed registry of `N` task slots plus one
//! [`LimitPolicy`] (how many tasks per slice) and one [`OrderPolicy`] (in
//! which order). It is a task itself, so schedulers nest.
//!
//! One slice:
//! 1. disabled schedulers do nothing
//! 2. the limit policy arms for the slice
//! 3. slots are visited in the order policy's order, empty slots skipped
//! 4. after each task, a continuable order may record a continuation point
//!    and end the slice; otherwise the limit policy may end it
//! 5. the slice reports the best result of the tasks it ran
//!
//! Size: N × 16 bytes + policies

use log::{debug, trace};

use crate::config::SlotCount;
use crate::limit::{LimitPolicy, RunAllTasks, RunOneTask};
use crate::order::{Continuable, FromFirst, OrderPolicy, RoundRobin};
use crate::task::{EnableableTask, Slice, Task, TaskResult};
use crate::timer::Clock;

/// Cooperative scheduler over `N` borrowed tasks
pub struct TaskScheduler<'a, L, O, const N: usize> {
    /// Registry; `None` slots are skipped
    tasks: [Option<&'a mut dyn Task>; N],
    limit: L,
    order: O,
    enabled: bool,
}

/// Try every task every slice, top slot first
pub type TryAllScheduler<'a, const N: usize> = TaskScheduler<'a, RunAllTasks, FromFirst, N>;

/// Shared-resource scheduler, rotating start slot
///
/// A task keeps being scheduled while it returns `RunContinue`. `Run` hands
/// the next slice to the following slot; `NotRun` lets lower slots look in
/// this slice.
pub type RoundRobinSharedScheduler<'a, const N: usize> = TaskScheduler<'a, RunOneTask, RoundRobin, N>;

/// Shared-resource scheduler, strict priority
///
/// As [`RoundRobinSharedScheduler`], except finished tasks hand control back
/// to the top slot.
pub type FromFirstSharedScheduler<'a, const N: usize> =
    TaskScheduler<'a, RunOneTask, Continuable<FromFirst>, N>;

impl<'a, L, O, const N: usize> TaskScheduler<'a, L, O, N>
where
    L: LimitPolicy,
    O: OrderPolicy<N>,
{
    /// Empty, enabled scheduler
    pub fn new(limit: L, order: O) -> Self {
        let () = SlotCount::<N>::VALID;
        Self {
            tasks: core::array::from_fn(|_| None),
            limit,
            order,
            enabled: true,
        }
    }

    /// Put `task` in `slot`, replacing any previous occupant
    ///
    /// Hands the task back if `slot` is out of range.
    pub fn set_task(&mut self, slot: usize, task: &'a mut dyn Task) -> Result<(), &'a mut dyn Task> {
        match self.tasks.get_mut(slot) {
            Some(entry) => {
                *entry = Some(task);
                Ok(())
            }
            None => Err(task),
        }
    }

    /// Put `task` in the first empty slot, returning its index
    ///
    /// Hands the task back if every slot is taken.
    pub fn register(&mut self, task: &'a mut dyn Task) -> Result<usize, &'a mut dyn Task> {
        match self.tasks.iter().position(Option::is_none) {
            Some(slot) => {
                self.tasks[slot] = Some(task);
                Ok(slot)
            }
            None => Err(task),
        }
    }

    /// Empty `slot`, returning what was there
    pub fn take_task(&mut self, slot: usize) -> Option<&'a mut dyn Task> {
        self.tasks.get_mut(slot).and_then(Option::take)
    }

    /// Task in `slot`, if any
    pub fn get_task(&self, slot: usize) -> Option<&(dyn Task + 'a)> {
        self.tasks.get(slot)?.as_deref()
    }

    /// Mutable access to the task in `slot`
    pub fn get_task_mut(&mut self, slot: usize) -> Option<&mut (dyn Task + 'a)> {
        self.tasks.get_mut(slot)?.as_deref_mut()
    }

    /// Number of populated slots
    pub fn occupied(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_some()).count()
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Limit policy
    pub fn limit(&self) -> &L {
        &self.limit
    }

    /// Limit policy, e.g. to change its budget
    pub fn limit_mut(&mut self) -> &mut L {
        &mut self.limit
    }

    /// Order policy
    pub fn order(&self) -> &O {
        &self.order
    }

    /// Order policy, e.g. to move the round-robin cursor
    pub fn order_mut(&mut self) -> &mut O {
        &mut self.order
    }

    /// Run one slice as the top-level scheduler
    ///
    /// Call this once per iteration of the main loop.
    pub fn tick(&mut self, clock: &dyn Clock) -> TaskResult {
        if !self.enabled {
            return TaskResult::NotRun;
        }
        let slice = Slice::begin(clock);
        self.run_slice(&slice)
    }

    fn run_slice(&mut self, slice: &Slice<'_>) -> TaskResult {
        self.limit.begin_slice(slice.begin_tick());

        let mut slot = Some(self.order.first());
        trace!("SCH begin @{:?}", slot);

        let mut best = TaskResult::NotRun;
        for _ in 0..N {
            let Some(index) = slot else {
                break;
            };

            if let Some(task) = self.tasks.get_mut(index).and_then(|t| t.as_deref_mut()) {
                let result = task.run(slice);
                best = best.max(result);
                trace!("SCH {} --> {}", index, result.code());

                // Checks the slice aggregate, not this task's own result: a
                // RunContinue after an earlier Run is not recorded.
                if O::CAN_CONTINUE && best == TaskResult::RunContinue {
                    debug!("SCH continue from {}", index);
                    self.order.continue_from(index);
                    break;
                }

                if self.limit.done_slice(result, slice.now()) {
                    trace!("SCH limit reached @{}", index);
                    break;
                }
            }

            slot = self.order.next(index);
        }

        best
    }
}

impl<'a, L, O, const N: usize> Default for TaskScheduler<'a, L, O, N>
where
    L: LimitPolicy + Default,
    O: OrderPolicy<N> + Default,
{
    fn default() -> Self {
        Self::new(L::default(), O::default())
    }
}

impl<'a, L, O, const N: usize> Task for TaskScheduler<'a, L, O, N>
where
    L: LimitPolicy,
    O: OrderPolicy<N>,
{
    /// Nested slice: opens its own slice on the owner's clock
    fn run(&mut self, owner: &Slice<'_>) -> TaskResult {
        self.tick(owner.clock())
    }
}

impl<'a, L, O, const N: usize> EnableableTask for TaskScheduler<'a, L, O, N>
where
    L: LimitPolicy,
    O: OrderPolicy<N>,
{
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
