//! Compile-time limits
//!
//! Everything is sized at compile time; there is no runtime configuration
//! and no allocation.

/// Default `RunNTasks` completion limit per slice
pub const DEFAULT_TASK_LIMIT: u8 = 255;

/// Largest task registry a scheduler accepts
pub const MAX_SLOTS: usize = 255;

/// Rejects a registry capacity outside `1..=MAX_SLOTS` at compile time.
pub(crate) struct SlotCount<const N: usize>;

impl<const N: usize> SlotCount<N> {
    pub(crate) const VALID: () = assert!(N > 0 && N <= MAX_SLOTS, "task registry needs 1..=255 slots");
}

/// Rejects a zero-capacity ring buffer at compile time.
pub(crate) struct RingCapacity<const N: usize>;

impl<const N: usize> RingCapacity<N> {
    pub(crate) const VALID: () = assert!(N > 0, "circular buffer capacity must be non-zero");
}
