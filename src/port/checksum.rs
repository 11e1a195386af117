/*!
 * Accelerated CRC32C Hook
 *
 * Hardware CRC32C (Castagnoli) via SSE4.2 on x86_64 or the ARMv8 CRC
 * extension on aarch64. The CPU probe runs once and is cached; when the host
 * (or the build) lacks the instructions the hook is `None` and the engine
 * uses its portable implementation.
 *
 * # Convention
 *
 * `extend(crc, data)` continues a finished checksum: the running value is
 * inverted on entry and the result inverted on exit, so
 * `extend(extend(0, a), b) == extend(0, a ++ b)`.
 */

use crate::core::sync::OnceSlot;

/// Signature of a CRC32C extend function
pub type Crc32cFn = fn(u32, &[u8]) -> u32;

/// A detected hardware CRC32C implementation
#[derive(Clone, Copy)]
pub struct Crc32cAccelerator {
    /// Instruction set in use
    pub backend: &'static str,
    /// Extend function
    pub extend: Crc32cFn,
}

impl std::fmt::Debug for Crc32cAccelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc32cAccelerator")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

static ACCELERATOR: OnceSlot<Option<Crc32cAccelerator>> = OnceSlot::new();

/// The cached accelerator, probing the CPU on first use
pub fn accelerator() -> Option<Crc32cAccelerator> {
    match ACCELERATOR.get_or_init(detect) {
        Ok(accel) => *accel,
        Err(e) => {
            tracing::warn!(error = %e, "CRC32C probe unavailable; using portable checksum");
            None
        }
    }
}

/// The function to wire in for CRC32C, or `None` to use the portable path
#[inline]
pub fn accelerated_crc32c_hook() -> Option<Crc32cFn> {
    accelerator().map(|accel| accel.extend)
}

/// Whether hardware CRC32C is available on this host and build
#[inline]
pub fn accelerated_crc32c_supported() -> bool {
    accelerator().is_some()
}

/// Extend `crc` over `data` in hardware
///
/// Returns `None` when acceleration is unavailable; the caller keeps its
/// running checksum and falls back to the portable algorithm.
#[inline]
pub fn try_accelerated_crc32c(crc: u32, data: &[u8]) -> Option<u32> {
    extend_with(accelerated_crc32c_hook(), crc, data)
}

/// Run `hook` over `data`, or `None` without touching `crc` when unwired
#[inline]
pub(crate) fn extend_with(hook: Option<Crc32cFn>, crc: u32, data: &[u8]) -> Option<u32> {
    hook.map(|extend| extend(crc, data))
}

#[cfg(all(feature = "accelerated-crc32c", target_arch = "x86_64"))]
fn detect() -> Option<Crc32cAccelerator> {
    if is_x86_feature_detected!("sse4.2") {
        Some(Crc32cAccelerator {
            backend: "sse4.2",
            extend: x86::extend,
        })
    } else {
        None
    }
}

#[cfg(all(feature = "accelerated-crc32c", target_arch = "aarch64"))]
fn detect() -> Option<Crc32cAccelerator> {
    if std::arch::is_aarch64_feature_detected!("crc") {
        Some(Crc32cAccelerator {
            backend: "armv8-crc",
            extend: arm::extend,
        })
    } else {
        None
    }
}

#[cfg(not(all(
    feature = "accelerated-crc32c",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
fn detect() -> Option<Crc32cAccelerator> {
    None
}

#[cfg(all(feature = "accelerated-crc32c", target_arch = "x86_64"))]
mod x86 {
    use std::arch::x86_64::{_mm_crc32_u64, _mm_crc32_u8};

    /// Only reachable through `detect`, after SSE4.2 was confirmed
    pub(super) fn extend(crc: u32, data: &[u8]) -> u32 {
        // SAFETY: this function is handed out only when SSE4.2 is present.
        unsafe { extend_sse42(crc, data) }
    }

    #[target_feature(enable = "sse4.2")]
    unsafe fn extend_sse42(crc: u32, data: &[u8]) -> u32 {
        let mut state = u64::from(!crc);
        let mut words = data.chunks_exact(8);
        for word in &mut words {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(word);
            state = _mm_crc32_u64(state, u64::from_le_bytes(bytes));
        }

        let mut state = state as u32;
        for &byte in words.remainder() {
            state = _mm_crc32_u8(state, byte);
        }
        !state
    }
}

#[cfg(all(feature = "accelerated-crc32c", target_arch = "aarch64"))]
mod arm {
    use std::arch::aarch64::{__crc32cb, __crc32cd};

    /// Only reachable through `detect`, after the CRC extension was confirmed
    pub(super) fn extend(crc: u32, data: &[u8]) -> u32 {
        // SAFETY: this function is handed out only when the CRC extension is present.
        unsafe { extend_crc(crc, data) }
    }

    #[target_feature(enable = "crc")]
    unsafe fn extend_crc(crc: u32, data: &[u8]) -> u32 {
        let mut state = !crc;
        let mut words = data.chunks_exact(8);
        for word in &mut words {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(word);
            state = __crc32cd(state, u64::from_le_bytes(bytes));
        }
        for &byte in words.remainder() {
            state = __crc32cb(state, byte);
        }
        !state
    }
}
