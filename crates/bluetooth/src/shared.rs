//! Interrupt-shared storage for a statically allocated scheduler.
//!
//! Operation-table handlers are plain `fn` pointers, so they reach the
//! scheduler through a `static`. [`IsrShared`] is that static: a
//! critical-section mutex around an optional value that is installed once at
//! start-up.
//!
//! ```
//! use bluetooth::shared::IsrShared;
//!
//! static COUNTER: IsrShared<u32> = IsrShared::new();
//!
//! COUNTER.install(0);
//! COUNTER.with(|n| *n += 1);
//! assert_eq!(COUNTER.with(|n| *n), Some(1));
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Critical-section protected slot for one value.
pub struct IsrShared<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<T>>>,
}

impl<T> IsrShared<T> {
    /// Empty slot, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store `value`, returning the previous one.
    pub fn install(&self, value: T) -> Option<T> {
        self.inner.lock(|cell| cell.borrow_mut().replace(value))
    }

    /// Remove and return the stored value.
    pub fn take(&self) -> Option<T> {
        self.inner.lock(|cell| cell.borrow_mut().take())
    }

    /// `true` once a value is installed.
    pub fn is_installed(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_some())
    }

    /// Run `f` on the stored value inside a critical section.
    ///
    /// Returns `None` when nothing is installed or when called re-entrantly
    /// from inside another `with` on the same slot.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.inner.lock(|cell| {
            let mut guard = cell.try_borrow_mut().ok()?;
            guard.as_mut().map(f)
        })
    }
}

impl<T> Default for IsrShared<T> {
    fn default() -> Self {
        Self::new()
    }
}
