//! Synchronization Primitives
//!
//! [`LockedCell`] is a per-instance mutex with closure-scoped access. Each
//! device owns its own cell, so a slow client callback on one device never
//! holds up another.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A cell providing interior mutability behind its own lock.
///
/// Closures passed to [`with`](Self::with) run while the lock is held. Keep
/// them short and never re-enter the same cell from inside one; the second
/// acquisition would deadlock.
///
/// A panic inside a closure does not poison the cell for later callers.
///
/// # Example
///
/// ```ignore
/// static COUNTER: LockedCell<u32> = LockedCell::new(0);
///
/// COUNTER.with(|c| *c += 1);
/// assert_eq!(COUNTER.with(|c| *c), 1);
/// ```
#[derive(Debug, Default)]
pub struct LockedCell<T> {
    inner: Mutex<T>,
}

impl<T> LockedCell<T> {
    /// Create a new cell holding `value`.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Execute a closure with exclusive access to the wrapped value.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut value = self.lock();
        f(&mut value)
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
