/*!
 * Platform Capabilities
 *
 * Host facts the engine decides serialization and checksum paths on,
 * resolved once at startup and logged.
 */

use super::checksum::{self, Crc32cFn};
use super::heap_profile;
use crate::core::config::{ChecksumMode, PortConfig};
use crate::core::errors::PortResult;
use crate::core::sync::OnceSlot;
use serde::Serialize;

/// Native byte order of the host
pub const LITTLE_ENDIAN: bool = cfg!(target_endian = "little");

/// Capability report for engine startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformCapabilities {
    /// Host is little-endian
    pub little_endian: bool,
    /// Hardware CRC32C is available and enabled
    pub accelerated_crc32c: bool,
    /// Instruction set behind the CRC32C hook
    pub crc32c_backend: Option<&'static str>,
    /// A heap profiler is registered and enabled
    pub heap_profiling: bool,
}

impl PlatformCapabilities {
    /// The CRC32C function to wire in, honoring the configured mode
    pub fn crc32c_hook(&self) -> Option<Crc32cFn> {
        if self.accelerated_crc32c {
            checksum::accelerated_crc32c_hook()
        } else {
            None
        }
    }

    /// Extend `crc` over `data` through the configured hook
    ///
    /// `None` when the hook is unwired; the caller keeps its running checksum.
    pub fn try_crc32c(&self, crc: u32, data: &[u8]) -> Option<u32> {
        checksum::extend_with(self.crc32c_hook(), crc, data)
    }
}

static CAPABILITIES: OnceSlot<PlatformCapabilities> = OnceSlot::new();

/// Probe the host under `config` without caching
pub fn detect_capabilities(config: &PortConfig) -> PlatformCapabilities {
    let accelerator = match config.checksum {
        ChecksumMode::Auto => checksum::accelerator(),
        ChecksumMode::Portable => None,
    };

    PlatformCapabilities {
        little_endian: LITTLE_ENDIAN,
        accelerated_crc32c: accelerator.is_some(),
        crc32c_backend: accelerator.map(|a| a.backend),
        heap_profiling: config.heap_profiling && heap_profile::heap_profiling_supported(),
    }
}

/// Resolve and cache the platform capabilities
///
/// The first call's configuration wins; later calls return the cached report.
/// Register a heap profiler before calling this for it to be reported.
pub fn init_port(config: &PortConfig) -> PortResult<&'static PlatformCapabilities> {
    let caps = CAPABILITIES.get_or_init(|| {
        let caps = detect_capabilities(config);
        tracing::info!(
            little_endian = caps.little_endian,
            accelerated_crc32c = caps.accelerated_crc32c,
            crc32c_backend = caps.crc32c_backend.unwrap_or("portable"),
            heap_profiling = caps.heap_profiling,
            checksum_mode = ?config.checksum,
            "Platform capabilities detected"
        );
        caps
    })?;
    Ok(caps)
}

/// Cached capabilities, resolving with the default configuration if needed
pub fn capabilities() -> PortResult<&'static PlatformCapabilities> {
    init_port(&PortConfig::default())
}
