/*!
 * Platform Port Hooks
 *
 * Host capabilities the storage engine queries at startup:
 * - Byte order (`LITTLE_ENDIAN`)
 * - Hardware CRC32C (`try_accelerated_crc32c`)
 * - Heap profiling (`get_heap_profile`)
 *
 * Missing capabilities are reported as `None` / `false`, never as errors.
 */

pub mod checksum;
pub mod heap_profile;
pub mod platform;

pub use checksum::{
    accelerated_crc32c_hook, accelerated_crc32c_supported, try_accelerated_crc32c,
    Crc32cAccelerator, Crc32cFn,
};
pub use heap_profile::{
    get_heap_profile, heap_profiling_supported, register_heap_profiler, HeapProfileHook,
    HeapProfiler,
};
pub use platform::{
    capabilities, detect_capabilities, init_port, PlatformCapabilities, LITTLE_ENDIAN,
};
