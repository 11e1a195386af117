/*!
 * Condition Variable
 *
 * Wait/signal primitive bound to exactly one `Mutex`, built directly on
 * `parking_lot_core` parking.
 *
 * # Design
 *
 * A waiter enqueues itself on the condvar's parking address and only then
 * releases the mutex (in the `before_sleep` callback). A signaller must hold
 * the same mutex, so it cannot run until the waiter is already queued: no
 * wakeup is lost between the predicate check and the sleep.
 *
 * The condvar adds no locking of its own beyond the parking queue.
 */

use super::mutex::{Mutex, MutexGuard};
use super::wake::WakeResult;
use parking_lot_core::{park, unpark_all, unpark_one, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Condition variable associated with one `Mutex<T>`
///
/// # Example
///
/// ```
/// use lsm_port::{ConditionVariable, Mutex};
/// use std::sync::Arc;
/// use std::thread;
///
/// let mu = Arc::new(Mutex::new(false));
/// let cv = Arc::new(ConditionVariable::new(mu.clone()));
///
/// let waiter = {
///     let (mu, cv) = (mu.clone(), cv.clone());
///     thread::spawn(move || {
///         let mut ready = mu.lock();
///         while !*ready {
///             cv.wait(&mut ready);
///         }
///     })
/// };
///
/// *mu.lock() = true;
/// {
///     let _held = mu.lock();
///     cv.signal();
/// }
/// waiter.join().unwrap();
/// ```
pub struct ConditionVariable<T = ()> {
    mu: Arc<Mutex<T>>,
    /// Approximate number of parked waiters (diagnostics)
    waiters: AtomicUsize,
}

impl<T> ConditionVariable<T> {
    /// Create a condition variable bound to `mu`
    pub fn new(mu: Arc<Mutex<T>>) -> Self {
        Self {
            mu,
            waiters: AtomicUsize::new(0),
        }
    }

    /// The associated mutex
    pub fn mutex(&self) -> &Arc<Mutex<T>> {
        &self.mu
    }

    /// Parking address; stable while any thread borrows `self`
    #[inline]
    fn key(&self) -> usize {
        self as *const Self as usize
    }

    /// Release the mutex, sleep until signalled, then re-acquire the mutex
    ///
    /// Spurious wakeups are possible; always re-check the predicate in a loop
    /// (or use [`wait_while`](Self::wait_while)).
    ///
    /// # Panics
    ///
    /// Panics if `guard` does not belong to the associated mutex.
    pub fn wait(&self, guard: &mut MutexGuard<'_, T>) {
        assert!(
            std::ptr::eq(guard.mutex, Arc::as_ptr(&self.mu)),
            "ConditionVariable::wait: guard belongs to a different mutex"
        );

        self.waiters.fetch_add(1, Ordering::Relaxed);

        // SAFETY: the key is the address of this condvar, which nothing else
        // parks on. `before_sleep` runs after we are queued and outside the
        // parking-lot bucket lock, so unlocking (which may unpark a mutex
        // waiter) is permitted there. The guard is not used until relocked.
        unsafe {
            park(
                self.key(),
                || true,
                || self.mu.unlock_raw(),
                |_key, _was_last| {},
                DEFAULT_PARK_TOKEN,
                None,
            );
        }

        self.waiters.fetch_sub(1, Ordering::Relaxed);
        self.mu.lock_raw();
    }

    /// Wait until `condition` returns false, re-checking after every wake
    ///
    /// Returns immediately without sleeping if the condition is already false.
    pub fn wait_while<F>(&self, guard: &mut MutexGuard<'_, T>, mut condition: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut **guard) {
            self.wait(guard);
        }
    }

    /// Wake at most one waiter
    ///
    /// The caller must hold the associated mutex (checked with debug assertions).
    pub fn signal(&self) -> WakeResult {
        self.mu.assert_held();
        // SAFETY: only condvar waiters park on this key.
        let result = unsafe { unpark_one(self.key(), |_| DEFAULT_UNPARK_TOKEN) };
        WakeResult::from_count(result.unparked_threads)
    }

    /// Wake every waiter
    ///
    /// The caller must hold the associated mutex (checked with debug assertions).
    pub fn signal_all(&self) -> WakeResult {
        self.mu.assert_held();
        // SAFETY: only condvar waiters park on this key.
        let unparked = unsafe { unpark_all(self.key(), DEFAULT_UNPARK_TOKEN) };
        WakeResult::from_count(unparked)
    }

    /// Approximate count of parked waiters (for diagnostics)
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}

impl<T> fmt::Debug for ConditionVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionVariable")
            .field("waiters", &self.waiter_count())
            .finish_non_exhaustive()
    }
}
