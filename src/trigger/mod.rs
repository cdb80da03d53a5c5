//! Update triggers decide when pending colors are flushed to hardware.
//!
//! A trigger notifies its subscribed listeners once when it starts and then
//! on every update. Listeners run on the trigger's own thread, one at a time.

mod device;
mod listeners;
mod manual;
mod signal;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

pub use device::{
    DEFAULT_MAX_UPDATE_RATE, DEFAULT_TIMEOUT, DeviceUpdateTrigger, DeviceUpdateTriggerConfig,
    TriggerState,
};
pub use manual::ManualUpdateTrigger;

pub(crate) use listeners::{Listeners, panic_message};

/// Why an update notification fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// New data was signalled.
    Data,
    /// No data arrived within the timeout, used for keep-alive traffic.
    Heartbeat,
}

/// Receives trigger notifications.
pub trait UpdateListener: Send + Sync {
    /// Called once on the trigger thread before the first update.
    fn on_starting(&self) {}

    fn on_update(&self, kind: UpdateKind);
}

/// Handle returned by [`UpdateTrigger::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to spawn trigger thread")]
    Spawn(#[from] std::io::Error),
    #[error("trigger timeout must be greater than zero")]
    ZeroTimeout,
}

/// Pacing primitive driving one or more update queues.
pub trait UpdateTrigger: Send + Sync {
    fn subscribe(&self, listener: Arc<dyn UpdateListener>) -> SubscriptionId;

    /// Returns `false` if the subscription was unknown.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Signal that new data is pending, never blocks.
    fn notify_data_ready(&self);

    /// Start firing notifications, a no-op if already started.
    fn start(&self) -> Result<(), TriggerError>;

    /// Stop firing notifications, a no-op if already stopped.
    fn stop(&self);
}

/// Lock a mutex, ignoring poisoning.
///
/// Every critical section in this crate leaves its data consistent, panics
/// from device code are caught before they reach a guard.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Convert a time-driver duration into a std duration for blocking waits.
pub(crate) fn to_std(duration: embassy_time::Duration) -> std::time::Duration {
    std::time::Duration::from_micros(duration.as_micros())
}
