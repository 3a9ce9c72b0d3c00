//! Fixed-capacity circular buffer shared with interrupt handlers
//!
//! [`Ring`] is the bare queue: plain `&mut self` methods, no guarding.
//! [`CircularBuffer`] wraps it so both sides of a task/ISR pair can use it
//! through a shared reference, each access running inside a critical
//! section of the chosen [`CriticalSection`] strategy.
//!
//! Single producer, single consumer. Two producers (or two consumers)
//! racing each other are not protected against.

use core::cell::UnsafeCell;
use core::marker::PhantomData;

use crate::config::RingCapacity;
use crate::critical::{CriticalSection, Interrupts, Unguarded};

/// Bounded FIFO of `N` elements
///
/// All `N` slots are usable; `count` tells full from empty.
#[derive(Debug, Clone)]
pub struct Ring<T, const N: usize> {
    slots: [T; N],
    /// Next write position
    head: usize,
    /// Next read position
    tail: usize,
    count: usize,
}

impl<T: Copy, const N: usize> Ring<T, N> {
    /// Empty ring with every slot preset to `fill`
    pub const fn filled(fill: T) -> Self {
        let () = RingCapacity::<N>::VALID;
        Self {
            slots: [fill; N],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    fn step(index: usize) -> usize {
        if index + 1 == N {
            0
        } else {
            index + 1
        }
    }

    /// Append at the head; `false` (and no change) when full
    pub fn push_head(&mut self, value: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[self.head] = value;
        self.head = Self::step(self.head);
        self.count += 1;
        true
    }

    /// Remove from the tail; `None` when empty
    pub fn pop_tail(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots[self.tail];
        self.tail = Self::step(self.tail);
        self.count -= 1;
        Some(value)
    }

    /// Next write slot, for filling in place before [`Ring::advance_head`]
    ///
    /// `None` when full: there is no next slot to write.
    pub fn peek_head(&mut self) -> Option<&mut T> {
        if self.is_full() {
            return None;
        }
        Some(&mut self.slots[self.head])
    }

    /// Oldest element, without removing it
    pub fn peek_tail(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        Some(&self.slots[self.tail])
    }

    /// Commit the slot returned by `peek_head`. No-op when full.
    pub fn advance_head(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.head = Self::step(self.head);
        self.count += 1;
        true
    }

    /// Drop the oldest element after reading it in place. No-op when empty.
    pub fn advance_tail(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.tail = Self::step(self.tail);
        self.count -= 1;
        true
    }

    /// No elements stored
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Every slot taken
    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Elements stored
    pub fn count(&self) -> usize {
        self.count
    }

    /// Free slots
    pub fn available(&self) -> usize {
        N - self.count
    }

    /// Total slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Forget all contents. Stored data is left in place.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}

impl<T: Copy + Default, const N: usize> Default for Ring<T, N> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}

/// [`Ring`] behind a critical-section strategy
///
/// ```
/// use coop_sched::{CircularBuffer, Interrupts};
///
/// static RX: CircularBuffer<u8, 16, Interrupts> = CircularBuffer::filled(0);
///
/// // UART interrupt
/// fn on_rx(byte: u8) {
///     let _ = RX.push_head(byte);
/// }
/// ```
pub struct CircularBuffer<T, const N: usize, C = Unguarded> {
    ring: UnsafeCell<Ring<T, N>>,
    _strategy: PhantomData<C>,
}

// SAFETY: every shared access to `ring` happens with interrupts masked and
// never hands out references into it.
unsafe impl<T: Copy + Send, const N: usize> Sync for CircularBuffer<T, N, Interrupts> {}

impl<T: Copy, const N: usize, C: CriticalSection> CircularBuffer<T, N, C> {
    /// Empty buffer with every slot preset to `fill`
    pub const fn filled(fill: T) -> Self {
        Self {
            ring: UnsafeCell::new(Ring::filled(fill)),
            _strategy: PhantomData,
        }
    }

    /// Run `op` on the ring inside a fresh critical section.
    fn guarded<R>(&self, op: impl FnOnce(&mut Ring<T, N>) -> R) -> R {
        let _guard = C::enter();
        // SAFETY: the section excludes the other context, `op` is one of the
        // closures below and never re-enters `self`, and T: Copy means no
        // user code runs while the borrow is live.
        op(unsafe { &mut *self.ring.get() })
    }

    /// Enter a section to batch several `*_locked` calls
    pub fn lock(&self) -> C::Guard {
        C::enter()
    }

    /// Append at the head; `false` (and no change) when full
    pub fn push_head(&self, value: T) -> bool {
        self.guarded(|ring| ring.push_head(value))
    }

    /// Remove from the tail; `None` when empty
    pub fn pop_tail(&self) -> Option<T> {
        self.guarded(|ring| ring.pop_tail())
    }

    /// [`CircularBuffer::push_head`] for a caller already inside a section
    pub fn push_head_locked(&self, value: T, _section: &C::Guard) -> bool {
        // SAFETY: `_section` proves exclusion; see `guarded`.
        unsafe { &mut *self.ring.get() }.push_head(value)
    }

    /// [`CircularBuffer::pop_tail`] for a caller already inside a section
    pub fn pop_tail_locked(&self, _section: &C::Guard) -> Option<T> {
        // SAFETY: `_section` proves exclusion; see `guarded`.
        unsafe { &mut *self.ring.get() }.pop_tail()
    }

    /// Fill the next write slot and commit it, all in one section
    ///
    /// `fill` starts from the slot's previous contents, so it can update a
    /// record field by field. Returns `false` without calling `fill` when
    /// full. `fill` must not touch this buffer.
    pub fn write_head(&self, fill: impl FnOnce(&mut T)) -> bool {
        let _guard = C::enter();
        // SAFETY: the section excludes the other context; the borrow ends
        // before `fill` runs.
        let Some(mut slot) = unsafe { &mut *self.ring.get() }.peek_head().copied() else {
            return false;
        };
        fill(&mut slot);
        // SAFETY: as above; `push_head` rechecks for room.
        unsafe { &mut *self.ring.get() }.push_head(slot)
    }

    /// Show the oldest element to `take`; drop it if `take` returns `true`
    ///
    /// Lets a consumer leave an element queued until it can handle it.
    /// Returns whether an element was consumed. `take` must not touch this
    /// buffer.
    pub fn read_tail(&self, take: impl FnOnce(&T) -> bool) -> bool {
        let _guard = C::enter();
        // SAFETY: the section excludes the other context; the borrow ends
        // before `take` runs.
        let Some(oldest) = unsafe { &*self.ring.get() }.peek_tail().copied() else {
            return false;
        };
        // SAFETY: as above.
        take(&oldest) && unsafe { &mut *self.ring.get() }.advance_tail()
    }

    /// Copy of the oldest element
    pub fn peek_tail(&self) -> Option<T> {
        self.guarded(|ring| ring.peek_tail().copied())
    }

    /// Drop the oldest element. No-op when empty.
    pub fn advance_tail(&self) -> bool {
        self.guarded(|ring| ring.advance_tail())
    }

    /// No elements stored
    pub fn is_empty(&self) -> bool {
        self.guarded(|ring| ring.is_empty())
    }

    /// Every slot taken
    pub fn is_full(&self) -> bool {
        self.guarded(|ring| ring.is_full())
    }

    /// Elements stored
    pub fn count(&self) -> usize {
        self.guarded(|ring| ring.count())
    }

    /// Free slots
    pub fn available(&self) -> usize {
        self.guarded(|ring| ring.available())
    }

    /// Total slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Forget all contents. Stored data is left in place.
    pub fn clear(&self) {
        self.guarded(|ring| ring.clear())
    }

    /// Exclusive access needs no section
    pub fn get_mut(&mut self) -> &mut Ring<T, N> {
        self.ring.get_mut()
    }

    /// Ring access for code that already excludes the other side, such as an
    /// interrupt handler that is itself the critical section.
    ///
    /// # Safety
    ///
    /// No other access to this buffer may happen while the returned
    /// reference is live.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn ring_unchecked(&self) -> &mut Ring<T, N> {
        &mut *self.ring.get()
    }
}

impl<T: Copy + Default, const N: usize, C: CriticalSection> Default for CircularBuffer<T, N, C> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}
