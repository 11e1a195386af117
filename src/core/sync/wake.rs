/*!
 * Wake Results
 *
 * Outcome of a signal operation, reported for diagnostics. Callers must not
 * derive correctness from it: a woken waiter can still lose the race for
 * the mutex and find its predicate false.
 */

/// What a `signal` or `signal_all` call did to the parked waiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// This many parked threads were unparked; `signal` reports at most 1
    Woken(usize),
    /// The condvar had nobody parked, so the signal was dropped
    NoWaiters,
}

impl WakeResult {
    #[inline]
    pub(crate) fn from_count(count: usize) -> Self {
        match count {
            0 => WakeResult::NoWaiters,
            n => WakeResult::Woken(n),
        }
    }

    /// Whether the signal reached a parked thread
    #[inline]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Threads unparked by the signal
    #[inline]
    pub fn count(&self) -> usize {
        match *self {
            WakeResult::Woken(n) => n,
            WakeResult::NoWaiters => 0,
        }
    }
}
