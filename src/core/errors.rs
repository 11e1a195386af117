/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 *
 * Only recoverable outcomes live here. Contract violations (waiting with the
 * wrong mutex, re-entrant locking) panic at the call site instead.
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for one-time initialization
pub type OnceResult<T> = Result<T, OnceError>;

/// Result type for port-level operations
pub type PortResult<T> = Result<T, PortError>;

/// One-time initialization errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum OnceError {
    /// Returned to the caller whose initializer failed
    #[error("Initializer failed: {0}")]
    #[diagnostic(
        code(once::initializer_failed),
        help("The control is now permanently failed. Fix the initializer and restart the process.")
    )]
    InitializerFailed(String),

    /// Returned to every other caller of a failed control
    #[error("Initialization previously failed")]
    #[diagnostic(
        code(once::failed),
        help("Another thread's initializer failed or panicked. Check earlier logs for the cause.")
    )]
    Failed,
}

/// Port layer errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PortError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Once(#[from] OnceError),

    #[error("A heap profiler is already registered")]
    #[diagnostic(
        code(port::heap_profiler_registered),
        help("Heap profilers can be registered once per process. Register during startup only.")
    )]
    HeapProfilerAlreadyRegistered,

    #[error("Invalid port configuration: {0}")]
    #[diagnostic(
        code(port::invalid_config),
        help("Check the LSM_PORT_* environment variables or the JSON passed to from_json.")
    )]
    InvalidConfig(String),
}
