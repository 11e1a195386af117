/*!
 * Core Module
 * Synchronization primitives, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod sync;

// Re-export for convenience
pub use config::{ChecksumMode, PortConfig};
pub use errors::*;
pub use sync::{
    AtomicPointer, ConditionVariable, Mutex, MutexGuard, OnceControl, OnceSlot, OnceState,
    SnapshotCell, WakeResult,
};
