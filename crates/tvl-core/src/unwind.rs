#![forbid(unsafe_code)]

//! Marking panics that will be caught and contained.
//!
//! A render boundary wraps its child in a [`ContainedScope`]. Process-wide
//! panic hooks call [`panic_is_contained`] and skip terminal teardown and
//! stderr reporting for panics that the boundary is about to catch.

use std::cell::Cell;

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Guard marking the current thread as inside a containing `catch_unwind`.
///
/// Nested scopes are counted; the mark clears when the outermost guard drops.
#[derive(Debug)]
pub struct ContainedScope {
    _private: (),
}

impl ContainedScope {
    /// Enter a contained scope on this thread.
    #[must_use = "the scope ends when the guard is dropped"]
    pub fn enter() -> Self {
        DEPTH.with(|depth| depth.set(depth.get().saturating_add(1)));
        Self { _private: () }
    }
}

impl Drop for ContainedScope {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Whether a panic raised on this thread right now will be contained.
pub fn panic_is_contained() -> bool {
    DEPTH.with(|depth| depth.get() > 0)
}
