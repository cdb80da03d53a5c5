//! Device update trigger.
//!
//! Owns one background thread per device. The thread waits for the
//! data-ready signal (or the timeout), fires an update and then sleeps long
//! enough to respect the device's update rate.
//!
//! # Usage
//!
//! ```ignore
//! let trigger = Arc::new(DeviceUpdateTrigger::new(DeviceUpdateTriggerConfig {
//!     update_rate_hard_limit: 60.0,
//!     ..Default::default()
//! })?);
//! let queue = UpdateQueue::new(Arc::clone(&trigger), device);
//! trigger.start()?;
//!
//! queue.set_data([(0, Color::WHITE)]);
//! ```

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

use embassy_time::{Duration, Instant};
use log::{debug, error};

use super::signal::{Signal, Wake};
use super::{
    Listeners, SubscriptionId, TriggerError, UpdateKind, UpdateListener, UpdateTrigger, lock,
    to_std,
};

/// Default maximum wait for data before the loop wakes anyway.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Default update rate in updates per second.
pub const DEFAULT_MAX_UPDATE_RATE: f64 = 30.0;

const THREAD_NAME: &str = "device-update-trigger";

/// Configuration for a [`DeviceUpdateTrigger`].
///
/// Rates are in updates per second, zero or less means "no limit".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceUpdateTriggerConfig {
    /// Maximum wait for data before the loop wakes without it.
    pub timeout: Duration,
    /// User throttle, can only be stricter than the hard limit.
    pub max_update_rate: f64,
    /// Highest rate the device can sustain.
    pub update_rate_hard_limit: f64,
    /// Fire [`UpdateKind::Heartbeat`] when the timeout elapses.
    pub heartbeat: bool,
}

impl Default for DeviceUpdateTriggerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_update_rate: DEFAULT_MAX_UPDATE_RATE,
            update_rate_hard_limit: 0.0,
            heartbeat: false,
        }
    }
}

impl DeviceUpdateTriggerConfig {
    /// Rate actually enforced.
    ///
    /// The hard limit wins when `max_update_rate` is unset or looser.
    pub fn effective_update_rate(&self) -> f64 {
        let hard_limit = self.update_rate_hard_limit;
        if self.max_update_rate <= 0.0 || (hard_limit > 0.0 && self.max_update_rate > hard_limit) {
            hard_limit
        } else {
            self.max_update_rate
        }
    }

    /// Minimum time between two updates, `None` if unlimited.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn update_interval(&self) -> Option<Duration> {
        let rate = self.effective_update_rate();
        (rate > 0.0).then(|| Duration::from_micros((1_000_000.0 / rate) as u64))
    }
}

/// Lifecycle of a [`DeviceUpdateTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TriggerState {
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
}

impl TriggerState {
    const fn from_raw(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Settings that may change while running.
#[derive(Debug, Clone, Copy)]
struct Settings {
    timeout: Duration,
    max_update_rate: f64,
    heartbeat: bool,
}

/// State shared with the trigger thread.
struct Shared {
    signal: Signal,
    listeners: Listeners,
    settings: Mutex<Settings>,
    update_rate_hard_limit: f64,
    last_update_micros: AtomicU64,
    worker: Mutex<Option<ThreadId>>,
    state: AtomicU8,
}

impl Shared {
    fn config(&self) -> DeviceUpdateTriggerConfig {
        let settings = *lock(&self.settings);
        DeviceUpdateTriggerConfig {
            timeout: settings.timeout,
            max_update_rate: settings.max_update_rate,
            update_rate_hard_limit: self.update_rate_hard_limit,
            heartbeat: settings.heartbeat,
        }
    }

    fn is_worker_thread(&self) -> bool {
        *lock(&self.worker) == Some(thread::current().id())
    }

    fn state(&self) -> TriggerState {
        TriggerState::from_raw(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: TriggerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn run(&self) {
        *lock(&self.worker) = Some(thread::current().id());
        debug!("update trigger running");

        self.listeners.notify_starting();

        loop {
            let config = self.config();
            match self.signal.wait(to_std(config.timeout)) {
                Wake::Cancelled => break,
                Wake::DataReady => {
                    let started = Instant::now();
                    self.listeners.notify_update(UpdateKind::Data);
                    let elapsed = started.elapsed();
                    self.last_update_micros
                        .store(elapsed.as_micros(), Ordering::Relaxed);

                    // Only the handler's own time counts against the interval
                    if let Some(interval) = config.update_interval() {
                        if elapsed < interval && self.signal.sleep(to_std(interval - elapsed)) {
                            break;
                        }
                    }
                }
                Wake::TimedOut => {
                    if config.heartbeat {
                        self.listeners.notify_update(UpdateKind::Heartbeat);
                    }
                }
            }
        }

        *lock(&self.worker) = None;
        // Cancelled from a listener: nobody joins us, so the loop reports
        // `Stopped` itself. An external stop already moved to `Stopping`.
        let _ = self.state.compare_exchange(
            TriggerState::Running as u8,
            TriggerState::Stopped as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        debug!("update trigger exited");
    }
}

/// Background pacing engine for one device.
pub struct DeviceUpdateTrigger {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_name: String,
}

impl DeviceUpdateTrigger {
    /// Create a stopped trigger.
    pub fn new(config: DeviceUpdateTriggerConfig) -> Result<Self, TriggerError> {
        if config.timeout.as_ticks() == 0 {
            return Err(TriggerError::ZeroTimeout);
        }

        Ok(Self {
            shared: Arc::new(Shared {
                signal: Signal::default(),
                listeners: Listeners::default(),
                settings: Mutex::new(Settings {
                    timeout: config.timeout,
                    max_update_rate: config.max_update_rate,
                    heartbeat: config.heartbeat,
                }),
                update_rate_hard_limit: config.update_rate_hard_limit,
                last_update_micros: AtomicU64::new(0),
                worker: Mutex::new(None),
                state: AtomicU8::new(TriggerState::Stopped as u8),
            }),
            handle: Mutex::new(None),
            thread_name: THREAD_NAME.to_owned(),
        })
    }

    /// Name the background thread, useful when several devices run.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn state(&self) -> TriggerState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == TriggerState::Running
    }

    /// Current configuration.
    pub fn config(&self) -> DeviceUpdateTriggerConfig {
        self.shared.config()
    }

    pub fn update_rate_hard_limit(&self) -> f64 {
        self.shared.update_rate_hard_limit
    }

    /// Change the user throttle, applied from the next loop iteration.
    pub fn set_max_update_rate(&self, rate: f64) {
        lock(&self.shared.settings).max_update_rate = rate;
    }

    pub fn set_timeout(&self, timeout: Duration) -> Result<(), TriggerError> {
        if timeout.as_ticks() == 0 {
            return Err(TriggerError::ZeroTimeout);
        }
        lock(&self.shared.settings).timeout = timeout;
        Ok(())
    }

    pub fn set_heartbeat(&self, heartbeat: bool) {
        lock(&self.shared.settings).heartbeat = heartbeat;
    }

    /// Time the listeners took to handle the most recent data update.
    pub fn last_update_time(&self) -> Duration {
        Duration::from_micros(self.shared.last_update_micros.load(Ordering::Relaxed))
    }

    /// Returns `true` if data was signalled and not yet picked up.
    pub fn has_pending_data(&self) -> bool {
        self.shared.signal.is_data_ready()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.listeners.len()
    }
}

impl UpdateTrigger for DeviceUpdateTrigger {
    fn subscribe(&self, listener: Arc<dyn UpdateListener>) -> SubscriptionId {
        self.shared.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.listeners.unsubscribe(id)
    }

    fn notify_data_ready(&self) {
        self.shared.signal.notify_data_ready();
    }

    fn start(&self) -> Result<(), TriggerError> {
        if self.shared.is_worker_thread() {
            return Ok(());
        }

        let mut handle = lock(&self.handle);
        if self.state() != TriggerState::Stopped {
            return Ok(());
        }
        self.shared.set_state(TriggerState::Starting);

        // Left behind by a loop that stopped itself, already exiting
        if let Some(finished) = handle.take() {
            if finished.join().is_err() {
                error!("update trigger {} panicked", self.thread_name);
            }
        }
        self.shared.signal.rearm();

        // Running before the spawn, so a loop that stops itself right away
        // still ends in `Stopped`
        self.shared.set_state(TriggerState::Running);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || shared.run());

        match spawned {
            Ok(worker) => {
                *handle = Some(worker);
                debug!("started update trigger {}", self.thread_name);
                Ok(())
            }
            Err(err) => {
                self.shared.set_state(TriggerState::Stopped);
                Err(err.into())
            }
        }
    }

    fn stop(&self) {
        // Joining ourselves would deadlock, just ask the loop to exit
        if self.shared.is_worker_thread() {
            self.shared.signal.cancel();
            return;
        }

        let mut handle = lock(&self.handle);
        let stopping = self.shared.state.compare_exchange(
            TriggerState::Running as u8,
            TriggerState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if stopping.is_err() {
            return;
        }
        self.shared.signal.cancel();

        if let Some(worker) = handle.take() {
            if worker.join().is_err() {
                error!("update trigger {} panicked", self.thread_name);
            }
        }
        self.shared.set_state(TriggerState::Stopped);
        debug!("stopped update trigger {}", self.thread_name);
    }
}

impl Drop for DeviceUpdateTrigger {
    fn drop(&mut self) {
        self.stop();
    }
}
