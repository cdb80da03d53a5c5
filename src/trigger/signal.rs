//! Wake-up signal between producers and the trigger thread.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use super::lock;

#[derive(Debug, Default)]
struct SignalState {
    data_ready: bool,
    cancelled: bool,
}

/// Outcome of [`Signal::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
    DataReady,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Default)]
pub(crate) struct Signal {
    state: Mutex<SignalState>,
    condvar: Condvar,
}

impl Signal {
    pub(crate) fn notify_data_ready(&self) {
        lock(&self.state).data_ready = true;
        self.condvar.notify_all();
    }

    pub(crate) fn cancel(&self) {
        lock(&self.state).cancelled = true;
        self.condvar.notify_all();
    }

    /// Clear cancellation before a restart, pending data is kept.
    pub(crate) fn rearm(&self) {
        lock(&self.state).cancelled = false;
    }

    pub(crate) fn is_data_ready(&self) -> bool {
        lock(&self.state).data_ready
    }

    /// Wait for data or cancellation, at most `timeout`.
    ///
    /// Consumes the data-ready flag. Cancellation wins over data.
    pub(crate) fn wait(&self, timeout: Duration) -> Wake {
        let guard = lock(&self.state);
        let (mut state, _) = self
            .condvar
            .wait_timeout_while(guard, timeout, |state| !state.data_ready && !state.cancelled)
            .unwrap_or_else(PoisonError::into_inner);

        if state.cancelled {
            Wake::Cancelled
        } else if state.data_ready {
            state.data_ready = false;
            Wake::DataReady
        } else {
            Wake::TimedOut
        }
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if cancelled.
    pub(crate) fn sleep(&self, duration: Duration) -> bool {
        let guard = lock(&self.state);
        let (state, _) = self
            .condvar
            .wait_timeout_while(guard, duration, |state| !state.cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        state.cancelled
    }
}
