//! Critical-section strategies
//!
//! A strategy hands out a guard that keeps asynchronous interruption away
//! for as long as it lives. The guard releases on drop, so every exit path
//! out of a guarded region (early returns included) ends the section.

use core::marker::PhantomData;

/// Scoped exclusion strategy
pub trait CriticalSection {
    /// Held for the duration of the section
    type Guard;

    /// Enter a critical section
    fn enter() -> Self::Guard;
}

/// No exclusion at all, for single-context or uncontended use
///
/// Buffers using this strategy are not `Sync` and cannot be shared with an
/// interrupt handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unguarded;

/// Proof of an (empty) unguarded section
#[derive(Debug)]
pub struct UnguardedToken(());

impl CriticalSection for Unguarded {
    type Guard = UnguardedToken;

    fn enter() -> UnguardedToken {
        UnguardedToken(())
    }
}

/// Masks interrupts through the platform's `critical-section` implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct Interrupts;

/// Interrupts stay masked until this is dropped
///
/// Not `Send`: a section must end in the context that opened it.
pub struct InterruptGuard {
    restore: critical_section::RestoreState,
    _not_send: PhantomData<*const ()>,
}

impl CriticalSection for Interrupts {
    type Guard = InterruptGuard;

    fn enter() -> InterruptGuard {
        // SAFETY: the matching release happens in `Drop`; guards are !Send
        // and drop in reverse order of creation, so sections nest properly.
        let restore = unsafe { critical_section::acquire() };
        InterruptGuard {
            restore,
            _not_send: PhantomData,
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // SAFETY: `restore` came from the `acquire` in `Interrupts::enter`.
        unsafe { critical_section::release(self.restore) }
    }
}
