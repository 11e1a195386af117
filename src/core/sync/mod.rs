/*!
 * Synchronization Primitives
 *
 * The locking and publication primitives the storage engine is built on:
 * - `Mutex`: non-reentrant exclusive lock with a debug ownership check
 * - `ConditionVariable`: wait/signal bound to one `Mutex`
 * - `AtomicPointer`: raw pointer slot with acquire/release and relaxed access
 * - `OnceControl` / `OnceSlot`: exactly-once initialization gates
 * - `SnapshotCell`: owned snapshot publication
 *
 * # Architecture
 *
 * `Mutex` wraps `parking_lot::RawMutex`. `ConditionVariable` and
 * `OnceControl` park directly through `parking_lot_core`, keyed on their own
 * addresses, so neither needs an auxiliary lock.
 *
 * # Use Cases
 *
 * - **Write path**: `Mutex` around the shared in-memory state
 * - **Background compaction**: `ConditionVariable` to sleep until work arrives
 * - **Read path**: `AtomicPointer` / `SnapshotCell` to read the current
 *   memtable without the mutex
 * - **Startup**: `OnceControl` around table construction and CPU probing
 */

mod atomic_pointer;
mod condvar;
mod mutex;
mod once;
mod once_slot;
mod snapshot;
mod thread_tag;
mod wake;

pub use atomic_pointer::AtomicPointer;
pub use condvar::ConditionVariable;
pub use mutex::{Mutex, MutexGuard};
pub use once::{OnceControl, OnceState};
pub use once_slot::OnceSlot;
pub use snapshot::SnapshotCell;
pub use wake::WakeResult;
