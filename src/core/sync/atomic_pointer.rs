/*!
 * Atomic Pointer
 *
 * One word-sized slot holding a raw address, with acquire/release and
 * relaxed access. The slot never owns or frees the pointee; for owned
 * snapshot publication see `SnapshotCell`.
 */

use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Lock-free pointer slot
///
/// Pair `release_store` with `acquire_load` whenever the reader must see the
/// writes that prepared the pointee. The `no_barrier_*` variants are only
/// untorn; use them when ordering is already established (e.g. under a
/// `Mutex`).
///
/// # Example
///
/// ```
/// use lsm_port::AtomicPointer;
///
/// static TABLE: [u32; 4] = [1, 2, 3, 4];
///
/// let slot = AtomicPointer::<[u32; 4]>::null();
/// slot.release_store(&TABLE as *const _ as *mut _);
/// let seen = slot.acquire_load();
/// assert_eq!(unsafe { (*seen)[2] }, 3);
/// ```
#[repr(transparent)]
pub struct AtomicPointer<T = ()> {
    rep: AtomicPtr<T>,
}

impl<T> AtomicPointer<T> {
    /// Slot initialized to `value`
    #[inline]
    pub const fn new(value: *mut T) -> Self {
        Self {
            rep: AtomicPtr::new(value),
        }
    }

    /// Slot initialized to null
    #[inline]
    pub const fn null() -> Self {
        Self::new(ptr::null_mut())
    }

    /// Read with acquire ordering
    #[inline(always)]
    pub fn acquire_load(&self) -> *mut T {
        self.rep.load(Ordering::Acquire)
    }

    /// Write with release ordering
    #[inline(always)]
    pub fn release_store(&self, value: *mut T) {
        self.rep.store(value, Ordering::Release)
    }

    /// Relaxed read: atomic, but no ordering with other memory
    #[inline(always)]
    pub fn no_barrier_load(&self) -> *mut T {
        self.rep.load(Ordering::Relaxed)
    }

    /// Relaxed write: atomic, but no ordering with other memory
    #[inline(always)]
    pub fn no_barrier_store(&self, value: *mut T) {
        self.rep.store(value, Ordering::Relaxed)
    }
}

impl<T> Default for AtomicPointer<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for AtomicPointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicPointer")
            .field(&self.no_barrier_load())
            .finish()
    }
}
