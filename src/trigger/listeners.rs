use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::error;

use super::{SubscriptionId, UpdateKind, UpdateListener, lock};

type Entry = (SubscriptionId, Arc<dyn UpdateListener>);

/// Subscriber list shared by trigger implementations.
///
/// Notifications run outside the list lock, so listeners may subscribe or
/// unsubscribe while being notified. A panicking listener is logged and does
/// not stop the remaining listeners.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: std::sync::Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl Listeners {
    pub(crate) fn subscribe(&self, listener: Arc<dyn UpdateListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.entries).push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub(crate) fn notify_starting(&self) {
        self.notify(|listener| listener.on_starting());
    }

    pub(crate) fn notify_update(&self, kind: UpdateKind) {
        self.notify(|listener| listener.on_update(kind));
    }

    fn notify(&self, call: impl Fn(&dyn UpdateListener)) {
        let snapshot: Vec<Arc<dyn UpdateListener>> = lock(&self.entries)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| call(&*listener))) {
                error!("update listener panicked: {}", panic_message(&*payload));
            }
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
