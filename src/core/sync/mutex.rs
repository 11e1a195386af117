/*!
 * Mutex
 *
 * Non-reentrant exclusive lock over `parking_lot::RawMutex`, with RAII guards
 * and a debug-only ownership check.
 *
 * # Ownership tracking
 *
 * With debug assertions the mutex records the tag of the owning thread. That
 * powers `assert_held` and turns re-entrant locking into a panic instead of a
 * deadlock. Without debug assertions the field does not exist and both checks
 * compile to nothing.
 */

use parking_lot::lock_api::RawMutex as RawMutexApi;
use parking_lot::RawMutex;
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

#[cfg(debug_assertions)]
use super::thread_tag;
#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicU64, Ordering};

/// Exclusive lock protecting a value of type `T`
///
/// Use `Mutex<()>` (the default) for a bare lock guarding state that lives
/// elsewhere.
///
/// # Example
///
/// ```
/// use lsm_port::Mutex;
///
/// let mu = Mutex::new(0u64);
/// {
///     let mut seq = mu.lock();
///     *seq += 1;
///     mu.assert_held();
/// } // unlocked here
/// assert_eq!(*mu.lock(), 1);
/// ```
pub struct Mutex<T = ()> {
    raw: RawMutex,
    #[cfg(debug_assertions)]
    owner: AtomicU64,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is serialized by `raw`.
unsafe impl<T: Send> Send for Mutex<T> {}
unsafe impl<T: Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    /// Create an unlocked mutex
    pub const fn new(value: T) -> Self {
        Self {
            raw: <RawMutex as RawMutexApi>::INIT,
            #[cfg(debug_assertions)]
            owner: AtomicU64::new(thread_tag::NO_THREAD),
            data: UnsafeCell::new(value),
        }
    }

    /// Block until the lock is acquired
    ///
    /// # Panics
    ///
    /// With debug assertions, panics if the calling thread already holds
    /// this mutex.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.lock_raw();
        MutexGuard {
            mutex: self,
            _not_send: PhantomData,
        }
    }

    /// Debug-only check that the calling thread holds the lock
    ///
    /// A no-op when debug assertions are disabled.
    #[inline]
    pub fn assert_held(&self) {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.owner.load(Ordering::Relaxed) == thread_tag::current(),
                "Mutex::assert_held: lock is not held by the calling thread"
            );
        }
    }

    /// Whether any thread currently holds the lock (diagnostics only)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Mutable access without locking; `&mut self` proves exclusivity
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consume the mutex, returning the protected value
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    #[inline]
    pub(crate) fn lock_raw(&self) {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.owner.load(Ordering::Relaxed) != thread_tag::current(),
                "Mutex::lock: re-entrant locking by the owning thread"
            );
        }
        self.raw.lock();
        #[cfg(debug_assertions)]
        self.owner.store(thread_tag::current(), Ordering::Relaxed);
    }

    /// # Safety
    ///
    /// The calling thread must hold the lock, and must not touch the
    /// protected value again until it re-acquires it.
    #[inline]
    pub(crate) unsafe fn unlock_raw(&self) {
        #[cfg(debug_assertions)]
        self.owner.store(thread_tag::NO_THREAD, Ordering::Relaxed);
        self.raw.unlock();
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Proof of ownership; the lock is released when this is dropped
///
/// Not `Send`: the lock must be released by the thread that acquired it.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct MutexGuard<'a, T = ()> {
    pub(crate) mutex: &'a Mutex<T>,
    _not_send: PhantomData<*const ()>,
}

// SAFETY: sharing `&MutexGuard` only hands out `&T`.
unsafe impl<T: Sync> Sync for MutexGuard<'_, T> {}

impl<'a, T> MutexGuard<'a, T> {
    /// The mutex this guard holds
    pub fn mutex(&self) -> &'a Mutex<T> {
        self.mutex
    }
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the guard proves exclusive ownership.
        unsafe { &*self.mutex.data.get() }
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard proves exclusive ownership.
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: the guard exists, so this thread holds the lock.
        unsafe { self.mutex.unlock_raw() }
    }
}

impl<T: fmt::Debug> fmt::Debug for MutexGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
