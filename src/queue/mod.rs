//! Per-device update queue.
//!
//! Producers write `(identifier, color)` pairs from any thread. Writes are
//! coalesced into one pending map (last write per identifier wins) until the
//! device's trigger fires, then the whole map is swapped out and flushed to the
//! device on the trigger thread.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{error, warn};
use thiserror::Error;

use crate::color::Color;
use crate::trigger::{
    DeviceUpdateTrigger, SubscriptionId, UpdateKind, UpdateListener, UpdateTrigger, lock,
    panic_message,
};

/// Hardware backend flushed by an [`UpdateQueue`].
///
/// All methods run on the trigger thread, never concurrently.
pub trait UpdateDevice: Send + 'static {
    /// Backend-defined LED key, never inspected by the queue.
    type Identifier: Eq + Hash + Clone + Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// One-time hardware handshake before the first update.
    fn on_starting(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Write a batch of colors, keys are unique.
    fn update(&mut self, batch: &[(Self::Identifier, Color)]) -> Result<(), Self::Error>;

    /// Keep-alive traffic when no data arrived within the trigger timeout.
    fn heartbeat(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Which device call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStage {
    Starting,
    Update,
    Heartbeat,
}

impl fmt::Display for FlushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Starting => "starting",
            Self::Update => "update",
            Self::Heartbeat => "heartbeat",
        })
    }
}

/// Device failure caught at the queue boundary.
#[derive(Debug, Error)]
pub enum FlushError<E> {
    #[error("device {stage} failed")]
    Device {
        stage: FlushStage,
        #[source]
        source: E,
    },
    #[error("device {stage} panicked: {message}")]
    Panicked { stage: FlushStage, message: String },
}

impl<E> FlushError<E> {
    pub fn stage(&self) -> FlushStage {
        match self {
            Self::Device { stage, .. } | Self::Panicked { stage, .. } => *stage,
        }
    }
}

type ErrorHandler<E> = Box<dyn Fn(&FlushError<E>) + Send + Sync>;

struct Pending<K> {
    map: Option<HashMap<K, Color>>,
    disposed: bool,
}

/// Listener half, subscribed to the trigger.
struct QueueCore<D: UpdateDevice> {
    pending: Mutex<Pending<D::Identifier>>,
    device: Mutex<D>,
    on_error: Option<ErrorHandler<D::Error>>,
    failed_flushes: AtomicU64,
}

impl<D: UpdateDevice> QueueCore<D> {
    fn is_disposed(&self) -> bool {
        lock(&self.pending).disposed
    }

    /// Swap the pending map out, `None` if nothing is pending.
    fn take_batch(&self) -> Option<Vec<(D::Identifier, Color)>> {
        let map = lock(&self.pending).map.take()?;
        if map.is_empty() {
            return None;
        }
        Some(map.into_iter().collect())
    }

    /// Call into the device, converting errors and panics into reports.
    fn dispatch(&self, stage: FlushStage, call: impl FnOnce(&mut D) -> Result<(), D::Error>) {
        let mut device = lock(&self.device);
        let result = panic::catch_unwind(AssertUnwindSafe(|| call(&mut *device)));
        drop(device);

        let error = match result {
            Ok(Ok(())) => return,
            Ok(Err(source)) => {
                let error = FlushError::Device { stage, source };
                warn!("{error}");
                error
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                let error = FlushError::Panicked { stage, message };
                error!("{error}");
                error
            }
        };

        self.failed_flushes.fetch_add(1, Ordering::Relaxed);
        if let Some(on_error) = &self.on_error {
            on_error(&error);
        }
    }
}

impl<D: UpdateDevice> UpdateListener for QueueCore<D> {
    fn on_starting(&self) {
        if self.is_disposed() {
            return;
        }
        self.dispatch(FlushStage::Starting, D::on_starting);
    }

    fn on_update(&self, kind: UpdateKind) {
        // A trigger may still hold a snapshot taken before `dispose`
        if self.is_disposed() {
            return;
        }
        match kind {
            UpdateKind::Data => {
                if let Some(batch) = self.take_batch() {
                    self.dispatch(FlushStage::Update, |device| device.update(&batch));
                }
            }
            UpdateKind::Heartbeat => {
                self.dispatch(FlushStage::Heartbeat, D::heartbeat);
            }
        }
    }
}

/// Coalescing buffer between color producers and one device.
pub struct UpdateQueue<D: UpdateDevice, T: UpdateTrigger + ?Sized = DeviceUpdateTrigger> {
    trigger: Arc<T>,
    core: Arc<QueueCore<D>>,
    subscription: SubscriptionId,
}

impl<D: UpdateDevice, T: UpdateTrigger + ?Sized> UpdateQueue<D, T> {
    /// Create a queue and subscribe it to `trigger`.
    ///
    /// Device failures are only logged.
    pub fn new(trigger: Arc<T>, device: D) -> Self {
        Self::build(trigger, device, None)
    }

    /// Create a queue reporting device failures to `on_error`.
    ///
    /// `on_error` runs on the trigger thread.
    pub fn with_error_handler<F>(trigger: Arc<T>, device: D, on_error: F) -> Self
    where
        F: Fn(&FlushError<D::Error>) + Send + Sync + 'static,
    {
        Self::build(trigger, device, Some(Box::new(on_error)))
    }

    fn build(trigger: Arc<T>, device: D, on_error: Option<ErrorHandler<D::Error>>) -> Self {
        let core = Arc::new(QueueCore {
            pending: Mutex::new(Pending {
                map: None,
                disposed: false,
            }),
            device: Mutex::new(device),
            on_error,
            failed_flushes: AtomicU64::new(0),
        });
        let subscription = trigger.subscribe(Arc::clone(&core) as Arc<dyn UpdateListener>);
        Self {
            trigger,
            core,
            subscription,
        }
    }

    /// Merge `entries` into the pending batch and signal the trigger.
    ///
    /// Never blocks on a flush. Empty input and writes after [`dispose`]
    /// are ignored.
    ///
    /// [`dispose`]: Self::dispose
    pub fn set_data<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (D::Identifier, Color)>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return;
        }

        {
            let mut pending = lock(&self.core.pending);
            if pending.disposed {
                return;
            }
            pending.map.get_or_insert_with(HashMap::new).extend(entries);
        }
        self.trigger.notify_data_ready();
    }

    /// Drop pending data without flushing it.
    pub fn reset(&self) {
        lock(&self.core.pending).map = None;
    }

    /// Returns `true` if data waits for the next flush.
    pub fn has_pending_data(&self) -> bool {
        lock(&self.core.pending)
            .map
            .as_ref()
            .is_some_and(|map| !map.is_empty())
    }

    /// Unsubscribe from the trigger and drop pending data.
    ///
    /// Idempotent. Later writes are ignored.
    pub fn dispose(&self) {
        {
            let mut pending = lock(&self.core.pending);
            if pending.disposed {
                return;
            }
            pending.disposed = true;
            pending.map = None;
        }
        self.trigger.unsubscribe(self.subscription);
    }

    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Run `f` with exclusive access to the device.
    ///
    /// Waits for a flush in progress to finish.
    pub fn with_device<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut lock(&self.core.device))
    }

    /// Number of device calls that failed or panicked.
    pub fn failed_flushes(&self) -> u64 {
        self.core.failed_flushes.load(Ordering::Relaxed)
    }

    pub fn trigger(&self) -> &Arc<T> {
        &self.trigger
    }
}

impl<D: UpdateDevice, T: UpdateTrigger + ?Sized> Drop for UpdateQueue<D, T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
