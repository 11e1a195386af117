/*!
 * LSM Port
 *
 * Platform layer beneath a log-structured storage engine: the locks,
 * condition variables, atomic pointers and once gates the engine coordinates
 * its foreground and compaction threads with, plus startup capability hooks
 * (byte order, hardware CRC32C, heap profiling).
 */

pub mod core;
pub mod monitoring;
pub mod port;

// Re-exports
pub use crate::core::{
    AtomicPointer, ChecksumMode, ConditionVariable, Mutex, MutexGuard, OnceControl, OnceError,
    OnceResult, OnceSlot, OnceState, PortConfig, PortError, PortResult, SnapshotCell, WakeResult,
};
pub use monitoring::init_tracing;
pub use port::{
    capabilities, get_heap_profile, init_port, register_heap_profiler, try_accelerated_crc32c,
    HeapProfiler, PlatformCapabilities, LITTLE_ENDIAN,
};
