/*!
 * Heap Profile Hook
 *
 * Optional heap-profile capture. Without a registered profiler every request
 * answers "not supported", which is the normal outcome on most builds and
 * not an error. A profiler can be registered once per hook.
 */

use crate::core::errors::{PortError, PortResult};
use crate::core::sync::OnceSlot;

/// A heap profiling integration (allocator statistics, sampling profiler, ...)
pub trait HeapProfiler: Send + Sync {
    /// Stream the current heap profile into `sink`
    ///
    /// Returns `false` if no profile could be produced.
    fn write_profile(&self, sink: &mut dyn FnMut(&[u8])) -> bool;

    /// Profiler name for logs
    fn name(&self) -> &'static str {
        "heap-profiler"
    }
}

/// Registration point for a single `HeapProfiler`
pub struct HeapProfileHook {
    profiler: OnceSlot<Box<dyn HeapProfiler>>,
}

impl HeapProfileHook {
    /// A hook with no profiler registered
    pub const fn new() -> Self {
        Self {
            profiler: OnceSlot::new(),
        }
    }

    /// Register `profiler`; fails if one is already registered
    pub fn register(&self, profiler: Box<dyn HeapProfiler>) -> PortResult<()> {
        let name = profiler.name();
        match self.profiler.set(profiler) {
            Ok(()) => {
                tracing::info!(profiler = name, "heap profiler registered");
                Ok(())
            }
            Err(rejected) => {
                tracing::warn!(
                    profiler = rejected.name(),
                    "heap profiler already registered; ignoring"
                );
                Err(PortError::HeapProfilerAlreadyRegistered)
            }
        }
    }

    /// Whether a profiler is registered
    #[inline]
    pub fn is_supported(&self) -> bool {
        self.profiler.is_initialized()
    }

    /// Capture a heap profile into `sink`
    ///
    /// Returns `false` ("not supported") when no profiler is registered or the
    /// profiler could not produce data.
    pub fn get_heap_profile<F>(&self, mut sink: F) -> bool
    where
        F: FnMut(&[u8]),
    {
        match self.profiler.get() {
            Some(profiler) => profiler.write_profile(&mut sink),
            None => false,
        }
    }
}

impl Default for HeapProfileHook {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_HOOK: HeapProfileHook = HeapProfileHook::new();

/// Register the process-wide heap profiler
pub fn register_heap_profiler(profiler: Box<dyn HeapProfiler>) -> PortResult<()> {
    GLOBAL_HOOK.register(profiler)
}

/// Whether a process-wide heap profiler is registered
pub fn heap_profiling_supported() -> bool {
    GLOBAL_HOOK.is_supported()
}

/// Capture a heap profile from the process-wide profiler
///
/// Returns `false` when profiling is not supported.
pub fn get_heap_profile<F>(sink: F) -> bool
where
    F: FnMut(&[u8]),
{
    GLOBAL_HOOK.get_heap_profile(sink)
}
