/*!
 * Heap Profile Hook Tests
 *
 * Process-wide registration; serialized because the hook is global
 */

use lsm_port::port::heap_profiling_supported;
use lsm_port::{get_heap_profile, register_heap_profiler, HeapProfiler, PortError};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingProfiler {
    dumps: Arc<AtomicUsize>,
}

impl HeapProfiler for CountingProfiler {
    fn write_profile(&self, sink: &mut dyn FnMut(&[u8])) -> bool {
        let n = self.dumps.fetch_add(1, Ordering::SeqCst) + 1;
        sink(format!("heap profile #{n}\n").as_bytes());
        true
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

#[test]
#[serial]
fn test_global_hook_lifecycle() {
    // Unsupported is a normal outcome before registration
    if !heap_profiling_supported() {
        let mut chunks = 0;
        assert!(!get_heap_profile(|_| chunks += 1));
        assert_eq!(chunks, 0);
    }

    let dumps = Arc::new(AtomicUsize::new(0));
    let first = register_heap_profiler(Box::new(CountingProfiler {
        dumps: dumps.clone(),
    }));
    assert!(first.is_ok());
    assert!(heap_profiling_supported());

    let mut out = Vec::new();
    assert!(get_heap_profile(|chunk| out.extend_from_slice(chunk)));
    assert_eq!(out, b"heap profile #1\n");

    let again = register_heap_profiler(Box::new(CountingProfiler {
        dumps: Arc::new(AtomicUsize::new(0)),
    }));
    assert_eq!(again, Err(PortError::HeapProfilerAlreadyRegistered));

    assert!(get_heap_profile(|_| {}));
    assert_eq!(dumps.load(Ordering::SeqCst), 2);
}

#[test]
#[serial]
fn test_capabilities_report_profiler_when_enabled() {
    let enabled = lsm_port::port::detect_capabilities(&lsm_port::PortConfig::default());
    let disabled = lsm_port::port::detect_capabilities(&lsm_port::PortConfig {
        heap_profiling: false,
        ..Default::default()
    });

    assert_eq!(enabled.heap_profiling, heap_profiling_supported());
    assert!(!disabled.heap_profiling);
}
