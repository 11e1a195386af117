/*!
 * Once Slot
 *
 * A value written exactly once through a `OnceControl`, then shared by
 * reference. This is where startup probes (CPU features, registered hooks)
 * cache their results.
 */

use super::once::OnceControl;
use crate::core::errors::{OnceError, OnceResult};
use std::cell::UnsafeCell;
use std::convert::Infallible;
use std::fmt::{self, Display};
use std::mem::MaybeUninit;

/// Write-once cell guarded by a `OnceControl`
///
/// ```
/// use lsm_port::OnceSlot;
///
/// static TABLE: OnceSlot<Vec<u32>> = OnceSlot::new();
///
/// let table = TABLE.get_or_init(|| (0..256).collect()).unwrap();
/// assert_eq!(table.len(), 256);
/// assert!(TABLE.get().is_some());
/// ```
pub struct OnceSlot<T> {
    control: OnceControl,
    value: UnsafeCell<MaybeUninit<T>>,
}

// SAFETY: the value is written once by the initializing thread before the
// control reaches Done (release) and only read after observing Done
// (acquire). Shared readers get `&T`, so `T: Sync` is required; the value
// may be dropped on another thread, so `T: Send` too.
unsafe impl<T: Send + Sync> Sync for OnceSlot<T> {}

impl<T> OnceSlot<T> {
    /// An empty slot
    pub const fn new() -> Self {
        Self {
            control: OnceControl::new(),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// The value, if initialization has completed
    ///
    /// Never blocks.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.control.is_done() {
            // SAFETY: Done implies the value was written.
            Some(unsafe { self.get_unchecked() })
        } else {
            None
        }
    }

    /// The value, initializing it with `init` if no caller has yet
    ///
    /// Blocks while another thread is initializing.
    pub fn get_or_init<F>(&self, init: F) -> OnceResult<&T>
    where
        F: FnOnce() -> T,
    {
        self.get_or_try_init(|| Ok::<T, Infallible>(init()))
    }

    /// Like [`get_or_init`](Self::get_or_init) with a fallible initializer
    ///
    /// A failure leaves the slot permanently empty (see `OnceControl`).
    pub fn get_or_try_init<F, E>(&self, init: F) -> OnceResult<&T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }

        self.control.try_run_once(|| {
            let value = init()?;
            // SAFETY: only the initializing thread reaches this write, and no
            // reader looks at the cell before Done.
            unsafe { (*self.value.get()).write(value) };
            Ok::<(), E>(())
        })?;

        // SAFETY: try_run_once returned Ok, so the control is Done.
        Ok(unsafe { self.get_unchecked() })
    }

    /// Store `value` if the slot is empty; otherwise hand it back
    pub fn set(&self, value: T) -> Result<(), T> {
        let mut pending = Some(value);
        // The value was stored iff the initializer took it.
        let _ = self.get_or_try_init(|| pending.take().ok_or(OnceError::Failed));
        pending.map_or(Ok(()), Err)
    }

    /// Whether the slot holds a value
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.control.is_done()
    }

    /// # Safety
    ///
    /// The control must be Done.
    #[inline]
    unsafe fn get_unchecked(&self) -> &T {
        (*self.value.get()).assume_init_ref()
    }
}

impl<T> Default for OnceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for OnceSlot<T> {
    fn drop(&mut self) {
        if self.control.is_done() {
            // SAFETY: Done implies the value was written, and `&mut self`
            // means no reader remains.
            unsafe { self.value.get_mut().assume_init_drop() }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OnceSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("OnceSlot").field(value).finish(),
            None => {
                let state = self.control.state();
                f.debug_tuple("OnceSlot").field(&state).finish()
            }
        }
    }
}
