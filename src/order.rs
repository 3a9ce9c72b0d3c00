//! Order policies: which slot to visit first and next
//!
//! Slots are indices into a scheduler's fixed registry of `N` entries. Order
//! state (cursors, continuation points) persists across slices; that is what
//! gives round-robin fairness and mid-list resumption.

/// Visitation strategy over `N` slots
pub trait OrderPolicy<const N: usize> {
    /// Can the scheduler resume mid-list on the next slice?
    const CAN_CONTINUE: bool;

    /// Slot to visit first this slice
    fn first(&mut self) -> usize;

    /// Slot to visit after `slot`, or `None` to end the pass
    fn next(&mut self, slot: usize) -> Option<usize>;

    /// Record `slot` as the start of the next slice. Only called when
    /// `CAN_CONTINUE` holds.
    fn continue_from(&mut self, slot: usize);

    /// Registry size this policy walks
    fn capacity(&self) -> usize {
        N
    }
}

/// Strict priority: always start at slot 0 and walk down
///
/// Earlier slots get first refusal every slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct FromFirst;

impl<const N: usize> OrderPolicy<N> for FromFirst {
    const CAN_CONTINUE: bool = false;

    fn first(&mut self) -> usize {
        0
    }

    fn next(&mut self, slot: usize) -> Option<usize> {
        let next = slot + 1;
        (next < N).then_some(next)
    }

    fn continue_from(&mut self, _slot: usize) {}
}

/// Rotating start slot
///
/// One cursor is shared by `first` and `next`: every step hands out the
/// cursor and moves it on. Each slice therefore starts one slot after the
/// previous one stopped, so every slot eventually gets to go first.
/// Inherently continuable: `continue_from` moves the cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    /// Cursor at slot 0
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Slot the next `first` call will hand out
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn take<const N: usize>(&mut self) -> usize {
        let slot = self.cursor % N;
        self.cursor = if slot + 1 >= N { 0 } else { slot + 1 };
        slot
    }
}

impl<const N: usize> OrderPolicy<N> for RoundRobin {
    const CAN_CONTINUE: bool = true;

    fn first(&mut self) -> usize {
        self.take::<N>()
    }

    fn next(&mut self, _slot: usize) -> Option<usize> {
        Some(self.take::<N>())
    }

    fn continue_from(&mut self, slot: usize) {
        self.cursor = slot % N;
    }
}

/// Adds one-shot resumption to any base order
///
/// When a continuation point was recorded, the next `first` returns it and
/// clears it; otherwise the base order decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Continuable<B> {
    base: B,
    resume_at: Option<usize>,
}

impl<B> Continuable<B> {
    /// Wrap `base` with no continuation pending
    pub const fn new(base: B) -> Self {
        Self { base, resume_at: None }
    }

    /// Pending continuation point, if any
    pub fn resume_at(&self) -> Option<usize> {
        self.resume_at
    }

    /// Wrapped order
    pub fn base(&self) -> &B {
        &self.base
    }
}

impl<B: OrderPolicy<N>, const N: usize> OrderPolicy<N> for Continuable<B> {
    const CAN_CONTINUE: bool = true;

    fn first(&mut self) -> usize {
        // Consumed here; the scheduler records it again if the task still
        // wants to continue.
        match self.resume_at.take() {
            Some(slot) => slot,
            None => self.base.first(),
        }
    }

    fn next(&mut self, slot: usize) -> Option<usize> {
        self.base.next(slot)
    }

    fn continue_from(&mut self, slot: usize) {
        if slot < N {
            self.resume_at = Some(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk<O: OrderPolicy<4>>(order: &mut O) -> [Option<usize>; 5] {
        let mut seen = [None; 5];
        let mut slot = Some(order.first());
        for entry in seen.iter_mut() {
            *entry = slot;
            slot = slot.and_then(|s| order.next(s));
        }
        seen
    }

    #[test]
    fn test_from_first_is_linear() {
        let mut order = FromFirst;
        assert_eq!(walk(&mut order), [Some(0), Some(1), Some(2), Some(3), None]);
        assert_eq!(OrderPolicy::<4>::capacity(&order), 4);
        assert!(!<FromFirst as OrderPolicy<4>>::CAN_CONTINUE);
    }

    #[test]
    fn test_from_first_ignores_continuation() {
        let mut order = FromFirst;
        OrderPolicy::<4>::continue_from(&mut order, 2);
        assert_eq!(OrderPolicy::<4>::first(&mut order), 0);
    }

    #[test]
    fn test_round_robin_rotates_start() {
        let mut order = RoundRobin::new();
        let starts: [usize; 5] = core::array::from_fn(|_| OrderPolicy::<4>::first(&mut order));
        assert_eq!(starts, [0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_round_robin_next_shares_cursor() {
        let mut order = RoundRobin::new();
        let first = OrderPolicy::<3>::first(&mut order);
        assert_eq!(first, 0);
        assert_eq!(OrderPolicy::<3>::next(&mut order, first), Some(1));
        assert_eq!(OrderPolicy::<3>::next(&mut order, 1), Some(2));
        assert_eq!(OrderPolicy::<3>::next(&mut order, 2), Some(0));
        // next slice starts after where the walk stopped
        assert_eq!(OrderPolicy::<3>::first(&mut order), 1);
    }

    #[test]
    fn test_round_robin_continue_moves_cursor() {
        let mut order = RoundRobin::new();
        OrderPolicy::<4>::continue_from(&mut order, 2);
        assert_eq!(order.cursor(), 2);
        assert_eq!(OrderPolicy::<4>::first(&mut order), 2);
        assert_eq!(order.cursor(), 3);
    }

    #[test]
    fn test_continuable_resumes_once() {
        let mut order = Continuable::new(FromFirst);
        OrderPolicy::<4>::continue_from(&mut order, 2);
        assert_eq!(order.resume_at(), Some(2));
        assert_eq!(walk(&mut order), [Some(2), Some(3), None, None, None]);
        assert_eq!(order.resume_at(), None);
        assert_eq!(walk(&mut order), [Some(0), Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn test_continuable_rejects_out_of_range() {
        let mut order = Continuable::new(FromFirst);
        OrderPolicy::<4>::continue_from(&mut order, 4);
        assert_eq!(order.resume_at(), None);
    }

    #[test]
    fn test_continuable_round_robin_keeps_base_cursor() {
        let mut order = Continuable::new(RoundRobin::new());
        OrderPolicy::<4>::continue_from(&mut order, 3);
        assert_eq!(OrderPolicy::<4>::first(&mut order), 3);
        assert_eq!(order.base().cursor(), 0);
        assert_eq!(OrderPolicy::<4>::first(&mut order), 0);
    }
}
