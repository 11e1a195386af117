/*!
 * Snapshot Cell
 *
 * Owned counterpart of `AtomicPointer` for publishing immutable snapshots
 * (e.g. the memtable currently being compacted). Readers get an `Arc` that
 * keeps the snapshot alive after it is replaced, so no manual reclamation is
 * needed.
 *
 * # Performance
 *
 * - **Reads**: lock-free, one atomic load plus a refcount bump
 * - **Writes**: one atomic swap; old snapshots are freed when the last
 *   reader drops its `Arc`
 */

use arc_swap::ArcSwapOption;
use std::fmt;
use std::sync::Arc;

/// Lock-free, possibly-empty slot holding an immutable snapshot
///
/// ```
/// use lsm_port::SnapshotCell;
///
/// let imm = SnapshotCell::empty();
/// assert!(imm.load().is_none());
///
/// imm.publish(vec![1u8, 2, 3]);
/// let snap = imm.load().unwrap();
/// assert_eq!(snap.len(), 3);
///
/// let retired = imm.take();
/// assert!(imm.load().is_none());
/// assert_eq!(retired.as_deref(), Some(&vec![1u8, 2, 3]));
/// ```
pub struct SnapshotCell<T> {
    inner: ArcSwapOption<T>,
}

impl<T> SnapshotCell<T> {
    /// An empty cell
    #[inline]
    pub fn empty() -> Self {
        Self {
            inner: ArcSwapOption::empty(),
        }
    }

    /// A cell holding `value`
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            inner: ArcSwapOption::from_pointee(value),
        }
    }

    /// Current snapshot, if any (acquire semantics)
    #[inline]
    pub fn load(&self) -> Option<Arc<T>> {
        self.inner.load_full()
    }

    /// Whether a snapshot is currently published
    #[inline]
    pub fn is_published(&self) -> bool {
        self.inner.load().is_some()
    }

    /// Publish `value`, replacing any previous snapshot (release semantics)
    #[inline]
    pub fn publish(&self, value: T) {
        self.inner.store(Some(Arc::new(value)));
    }

    /// Publish an already shared snapshot
    #[inline]
    pub fn publish_arc(&self, value: Arc<T>) {
        self.inner.store(Some(value));
    }

    /// Publish `value` and return the snapshot it replaced
    #[inline]
    pub fn swap(&self, value: T) -> Option<Arc<T>> {
        self.inner.swap(Some(Arc::new(value)))
    }

    /// Clear the cell, returning the retired snapshot
    #[inline]
    pub fn take(&self) -> Option<Arc<T>> {
        self.inner.swap(None)
    }

    /// Replace `expected` with `value` only if `expected` is still current
    ///
    /// Returns `Ok(())` on success, or `Err` with the snapshot actually found.
    pub fn compare_and_publish(
        &self,
        expected: Option<&Arc<T>>,
        value: T,
    ) -> Result<(), Option<Arc<T>>> {
        let current = expected.cloned();
        let guard = self
            .inner
            .compare_and_swap(&current, Some(Arc::new(value)));
        let previous: &Option<Arc<T>> = &guard;

        let matched = match (previous.as_ref(), current.as_ref()) {
            (Some(found), Some(wanted)) => Arc::ptr_eq(found, wanted),
            (None, None) => true,
            _ => false,
        };

        if matched {
            Ok(())
        } else {
            Err(previous.clone())
        }
    }
}

impl<T> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for SnapshotCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnapshotCell").field(&self.load()).finish()
    }
}
