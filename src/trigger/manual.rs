//! Manual update trigger.
//!
//! Fires notifications synchronously on the caller's thread. Useful when the
//! application already runs its own frame loop, and in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    Listeners, SubscriptionId, TriggerError, UpdateKind, UpdateListener, UpdateTrigger,
};

#[derive(Default)]
pub struct ManualUpdateTrigger {
    listeners: Listeners,
    running: AtomicBool,
    data_ready: AtomicBool,
}

impl ManualUpdateTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Returns `true` if data was signalled since the last update.
    pub fn has_pending_data(&self) -> bool {
        self.data_ready.load(Ordering::Acquire)
    }

    /// Fire a data update on the calling thread.
    ///
    /// Returns `false` without notifying if the trigger is not started.
    pub fn trigger_update(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.data_ready.store(false, Ordering::Release);
        self.listeners.notify_update(UpdateKind::Data);
        true
    }

    /// Fire a heartbeat on the calling thread.
    pub fn trigger_heartbeat(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.listeners.notify_update(UpdateKind::Heartbeat);
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl UpdateTrigger for ManualUpdateTrigger {
    fn subscribe(&self, listener: Arc<dyn UpdateListener>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn notify_data_ready(&self) {
        self.data_ready.store(true, Ordering::Release);
    }

    /// Fires the starting notification on the calling thread.
    fn start(&self) -> Result<(), TriggerError> {
        if !self.running.swap(true, Ordering::AcqRel) {
            self.listeners.notify_starting();
        }
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}
