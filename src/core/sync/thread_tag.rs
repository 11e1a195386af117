/*!
 * Thread Tags
 *
 * Small non-zero per-thread identifiers that fit in an atomic word.
 * `std::thread::ThreadId` cannot be stored atomically, so ownership checks
 * use these instead. Zero means "no thread".
 */

use std::sync::atomic::{AtomicU64, Ordering};

/// Tag value meaning "no owner"
pub(crate) const NO_THREAD: u64 = 0;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static TAG: u64 = NEXT_TAG.fetch_add(1, Ordering::Relaxed);
}

/// Tag of the calling thread (stable for the thread's lifetime, never zero)
#[inline]
pub(crate) fn current() -> u64 {
    TAG.with(|tag| *tag)
}
