/*!
 * One-Time Initialization
 *
 * `OnceControl` is an exactly-once gate: the first caller runs the
 * initializer, concurrent callers park until it settles, later callers
 * return immediately.
 *
 * # State machine
 *
 * ```text
 * NotStarted ──CAS──▶ InProgress ──Ok──────▶ Done
 *                          └──────Err/panic──▶ Failed
 * ```
 *
 * Transitions are one-way. The settling store uses `Release` and every state
 * read uses `Acquire`, so a caller that observes `Done` sees all of the
 * initializer's writes. Waiters park on the state word's address and are
 * released with `unpark_all`; the park validation re-reads the state under
 * the parking-lot bucket lock, so a completion cannot slip between the check
 * and the sleep.
 */

use super::thread_tag;
use crate::core::errors::{OnceError, OnceResult};
use parking_lot_core::{park, unpark_all, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::convert::Infallible;
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

const NOT_STARTED: u8 = 0;
const IN_PROGRESS: u8 = 1;
const DONE: u8 = 2;
const FAILED: u8 = 3;

/// Observable state of a `OnceControl`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnceState {
    NotStarted,
    InProgress,
    Done,
    Failed,
}

impl OnceState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            NOT_STARTED => OnceState::NotStarted,
            IN_PROGRESS => OnceState::InProgress,
            DONE => OnceState::Done,
            _ => OnceState::Failed,
        }
    }
}

/// Exactly-once execution gate
///
/// Usable in `static`s:
///
/// ```
/// use lsm_port::OnceControl;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// static INIT: OnceControl = OnceControl::new();
/// static BUILT: AtomicUsize = AtomicUsize::new(0);
///
/// for _ in 0..3 {
///     INIT.run_once(|| {
///         BUILT.fetch_add(1, Ordering::Relaxed);
///     })
///     .unwrap();
/// }
/// assert_eq!(BUILT.load(Ordering::Relaxed), 1);
/// ```
pub struct OnceControl {
    state: AtomicU8,
    /// Tag of the thread running the initializer while `InProgress`
    runner: AtomicU64,
}

impl OnceControl {
    /// A control in the `NotStarted` state
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(NOT_STARTED),
            runner: AtomicU64::new(thread_tag::NO_THREAD),
        }
    }

    /// Current state (acquire read)
    #[inline]
    pub fn state(&self) -> OnceState {
        OnceState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Whether the initializer has completed successfully
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) == DONE
    }

    /// Run `init` exactly once across all callers of this control
    ///
    /// Returns once the initializer has completed, whichever thread ran it.
    /// Fails only if the initializer panicked (here or on another thread).
    ///
    /// # Panics
    ///
    /// Panics if called from inside this control's own initializer, and
    /// propagates a panic raised by `init`.
    pub fn run_once<F>(&self, init: F) -> OnceResult<()>
    where
        F: FnOnce(),
    {
        self.try_run_once(|| {
            init();
            Ok::<(), Infallible>(())
        })
    }

    /// Run a fallible `init` exactly once across all callers of this control
    ///
    /// If `init` returns an error the control becomes permanently `Failed`:
    /// this caller gets [`OnceError::InitializerFailed`], every waiter and
    /// every later caller gets [`OnceError::Failed`].
    pub fn try_run_once<F, E>(&self, init: F) -> OnceResult<()>
    where
        F: FnOnce() -> Result<(), E>,
        E: Display,
    {
        let mut init = Some(init);

        loop {
            match self.state.load(Ordering::Acquire) {
                DONE => return Ok(()),
                FAILED => return Err(OnceError::Failed),
                NOT_STARTED => {
                    if self
                        .state
                        .compare_exchange_weak(
                            NOT_STARTED,
                            IN_PROGRESS,
                            Ordering::Acquire,
                            Ordering::Acquire,
                        )
                        .is_err()
                    {
                        continue;
                    }

                    // The CAS succeeds at most once per control, so the
                    // initializer is still present here.
                    let Some(init) = init.take() else {
                        unreachable!("OnceControl initializer consumed twice");
                    };
                    return self.run_initializer(init);
                }
                _ => self.park_while_in_progress(),
            }
        }
    }

    fn run_initializer<F, E>(&self, init: F) -> OnceResult<()>
    where
        F: FnOnce() -> Result<(), E>,
        E: Display,
    {
        self.runner.store(thread_tag::current(), Ordering::Relaxed);
        // Settles as Failed unless explicitly completed, which covers panics.
        let mut settle = Settle {
            control: self,
            outcome: FAILED,
        };

        match init() {
            Ok(()) => {
                settle.outcome = DONE;
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(reason = %reason, "once initializer failed");
                Err(OnceError::InitializerFailed(reason))
            }
        }
    }

    fn park_while_in_progress(&self) {
        assert!(
            self.runner.load(Ordering::Relaxed) != thread_tag::current(),
            "OnceControl::run_once re-entered from its own initializer"
        );

        // SAFETY: the key is the address of this control's state word, which
        // only this type parks on.
        unsafe {
            park(
                self.key(),
                || self.state.load(Ordering::Acquire) == IN_PROGRESS,
                || {},
                |_key, _was_last| {},
                DEFAULT_PARK_TOKEN,
                None,
            );
        }
    }

    #[inline]
    fn key(&self) -> usize {
        &self.state as *const AtomicU8 as usize
    }
}

impl Default for OnceControl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OnceControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceControl")
            .field("state", &self.state())
            .finish()
    }
}

/// Publishes the initializer's outcome and releases parked waiters
struct Settle<'a> {
    control: &'a OnceControl,
    outcome: u8,
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::warn!("once initializer panicked; control marked failed");
        }
        self.control
            .runner
            .store(thread_tag::NO_THREAD, Ordering::Relaxed);
        self.control.state.store(self.outcome, Ordering::Release);
        // SAFETY: waiters park on this exact key.
        unsafe {
            unpark_all(self.control.key(), DEFAULT_UNPARK_TOKEN);
        }
    }
}
