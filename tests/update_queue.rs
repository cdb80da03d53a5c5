mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration as StdDuration, Instant as StdInstant};

    use embassy_time::Duration;
    use light_pacer::color::Color;
    use light_pacer::queue::{FlushError, FlushStage, UpdateDevice, UpdateQueue};
    use light_pacer::trigger::{
        DeviceUpdateTrigger, DeviceUpdateTriggerConfig, ManualUpdateTrigger, SubscriptionId,
        TriggerError, UpdateKind, UpdateListener, UpdateTrigger,
    };
    use thiserror::Error;

    const RED: Color = Color::from_rgb_f32(1.0, 0.0, 0.0);
    const BLUE: Color = Color::from_rgb_f32(0.0, 0.0, 1.0);

    #[derive(Debug, Error)]
    #[error("device offline")]
    struct Offline;

    /// Records every batch, can be told to fail or panic
    #[derive(Default)]
    struct RecordingDevice {
        batches: Vec<Vec<(&'static str, Color)>>,
        starting: usize,
        heartbeats: usize,
        fail: bool,
        panic: bool,
    }

    impl UpdateDevice for RecordingDevice {
        type Identifier = &'static str;
        type Error = Offline;

        fn on_starting(&mut self) -> Result<(), Offline> {
            self.starting += 1;
            Ok(())
        }

        fn update(&mut self, batch: &[(&'static str, Color)]) -> Result<(), Offline> {
            if self.panic {
                panic!("driver crashed");
            }
            if self.fail {
                return Err(Offline);
            }
            let mut batch = batch.to_vec();
            batch.sort_by_key(|(key, _)| *key);
            self.batches.push(batch);
            Ok(())
        }

        fn heartbeat(&mut self) -> Result<(), Offline> {
            self.heartbeats += 1;
            Ok(())
        }
    }

    /// Slow device tracking concurrent `update` calls
    #[derive(Default)]
    struct SlowDeviceState {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        updates: AtomicUsize,
        latest: Mutex<HashMap<usize, Color>>,
    }

    struct SlowDevice {
        state: Arc<SlowDeviceState>,
        delay: StdDuration,
    }

    impl UpdateDevice for SlowDevice {
        type Identifier = usize;
        type Error = Offline;

        fn update(&mut self, batch: &[(usize, Color)]) -> Result<(), Offline> {
            let state = &self.state;
            let in_flight = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            state.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

            thread::sleep(self.delay);
            state.latest.lock().unwrap().extend(batch.iter().copied());

            state.updates.fetch_add(1, Ordering::SeqCst);
            state.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn unlimited_trigger() -> Arc<DeviceUpdateTrigger> {
        let config = DeviceUpdateTriggerConfig {
            timeout: Duration::from_millis(20),
            max_update_rate: 0.0,
            update_rate_hard_limit: 0.0,
            heartbeat: false,
        };
        Arc::new(DeviceUpdateTrigger::new(config).unwrap())
    }

    fn wait_until(timeout: StdDuration, condition: impl Fn() -> bool) -> bool {
        let deadline = StdInstant::now() + timeout;
        while StdInstant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(StdDuration::from_millis(1));
        }
        condition()
    }

    fn channel_color(value: usize) -> Color {
        Color::from_rgb_u8((value % 256) as u8, (value / 256) as u8, 0)
    }

    #[test]
    fn test_last_write_wins_in_one_batch() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        let queue = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());
        trigger.start().unwrap();

        queue.set_data([("a", RED)]);
        queue.set_data([("a", BLUE), ("b", RED)]);
        assert!(queue.has_pending_data());
        assert!(trigger.has_pending_data());

        assert!(trigger.trigger_update());
        assert!(!queue.has_pending_data());

        let batches = queue.with_device(|device| device.batches.clone());
        assert_eq!(batches, vec![vec![("a", BLUE), ("b", RED)]]);

        // Nothing pending, nothing flushed
        assert!(trigger.trigger_update());
        assert_eq!(queue.with_device(|device| device.batches.len()), 1);
    }

    #[test]
    fn test_empty_write_does_not_signal() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        let queue = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());

        queue.set_data(Vec::new());
        assert!(!queue.has_pending_data());
        assert!(!trigger.has_pending_data());
    }

    #[test]
    fn test_reset_discards_pending_data() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        let queue = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());
        trigger.start().unwrap();

        queue.set_data([("a", RED)]);
        queue.reset();
        assert!(!queue.has_pending_data());

        trigger.trigger_update();
        assert!(queue.with_device(|device| device.batches.is_empty()));
    }

    #[test]
    fn test_starting_and_heartbeat_reach_device() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        let queue = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());

        trigger.start().unwrap();
        trigger.trigger_heartbeat();
        trigger.trigger_heartbeat();

        let (starting, heartbeats) =
            queue.with_device(|device| (device.starting, device.heartbeats));
        assert_eq!(starting, 1);
        assert_eq!(heartbeats, 2);
    }

    #[test]
    fn test_dispose() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        let queue = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());
        trigger.start().unwrap();
        assert_eq!(trigger.subscriber_count(), 1);

        queue.set_data([("a", RED)]);
        queue.dispose();
        queue.dispose();
        assert!(queue.is_disposed());
        assert_eq!(trigger.subscriber_count(), 0);

        queue.set_data([("b", RED)]);
        assert!(!queue.has_pending_data());
        trigger.trigger_update();
        assert!(queue.with_device(|device| device.batches.is_empty()));
    }

    /// Keeps listeners after unsubscribe, like a notification already in progress
    #[derive(Default)]
    struct StaleTrigger {
        inner: ManualUpdateTrigger,
        listeners: Mutex<Vec<Arc<dyn UpdateListener>>>,
    }

    impl StaleTrigger {
        fn fire(&self, kind: UpdateKind) {
            let listeners = self.listeners.lock().unwrap().clone();
            for listener in listeners {
                listener.on_starting();
                listener.on_update(kind);
            }
        }
    }

    impl UpdateTrigger for StaleTrigger {
        fn subscribe(&self, listener: Arc<dyn UpdateListener>) -> SubscriptionId {
            self.listeners.lock().unwrap().push(Arc::clone(&listener));
            self.inner.subscribe(listener)
        }

        fn unsubscribe(&self, id: SubscriptionId) -> bool {
            self.inner.unsubscribe(id)
        }

        fn notify_data_ready(&self) {
            self.inner.notify_data_ready();
        }

        fn start(&self) -> Result<(), TriggerError> {
            self.inner.start()
        }

        fn stop(&self) {
            self.inner.stop();
        }
    }

    #[test]
    fn test_disposed_queue_ignores_late_notifications() {
        let trigger = Arc::new(StaleTrigger::default());
        let queue = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());

        queue.set_data([("a", RED)]);
        queue.dispose();

        trigger.fire(UpdateKind::Heartbeat);
        trigger.fire(UpdateKind::Data);

        let (starting, heartbeats, batches) = queue.with_device(|device| {
            (device.starting, device.heartbeats, device.batches.len())
        });
        assert_eq!((starting, heartbeats, batches), (0, 0, 0));
        assert_eq!(queue.failed_flushes(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        {
            let _queue = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());
            let _other = UpdateQueue::new(Arc::clone(&trigger), RecordingDevice::default());
            assert_eq!(trigger.subscriber_count(), 2);
        }
        assert_eq!(trigger.subscriber_count(), 0);
    }

    #[test]
    fn test_device_errors_are_reported() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        let reported = Arc::new(Mutex::new(Vec::new()));
        let device = RecordingDevice {
            fail: true,
            ..Default::default()
        };
        let queue = {
            let reported = Arc::clone(&reported);
            UpdateQueue::with_error_handler(
                Arc::clone(&trigger),
                device,
                move |error: &FlushError<Offline>| {
                    let panicked = matches!(error, FlushError::Panicked { .. });
                    reported.lock().unwrap().push((error.stage(), panicked));
                },
            )
        };
        trigger.start().unwrap();

        queue.set_data([("a", RED)]);
        trigger.trigger_update();
        assert_eq!(queue.failed_flushes(), 1);

        queue.with_device(|device| {
            device.fail = false;
            device.panic = true;
        });
        queue.set_data([("a", BLUE)]);
        trigger.trigger_update();
        assert_eq!(queue.failed_flushes(), 2);

        // The device keeps working after a panic
        queue.with_device(|device| device.panic = false);
        queue.set_data([("b", BLUE)]);
        trigger.trigger_update();
        assert_eq!(queue.failed_flushes(), 2);
        assert_eq!(
            queue.with_device(|device| device.batches.clone()),
            vec![vec![("b", BLUE)]]
        );

        assert_eq!(
            *reported.lock().unwrap(),
            vec![(FlushStage::Update, false), (FlushStage::Update, true)]
        );
    }

    #[test]
    fn test_flush_error_messages() {
        let error: FlushError<Offline> = FlushError::Device {
            stage: FlushStage::Heartbeat,
            source: Offline,
        };
        assert_eq!(error.to_string(), "device heartbeat failed");
        assert_eq!(
            std::error::Error::source(&error).map(ToString::to_string),
            Some("device offline".to_owned())
        );

        let error: FlushError<Offline> = FlushError::Panicked {
            stage: FlushStage::Update,
            message: "boom".to_owned(),
        };
        assert_eq!(error.to_string(), "device update panicked: boom");
    }

    #[test]
    fn test_at_most_one_flush_in_flight() {
        const PRODUCERS: usize = 8;
        const WRITES: usize = 200;

        let trigger = unlimited_trigger();
        let state = Arc::new(SlowDeviceState::default());
        let device = SlowDevice {
            state: Arc::clone(&state),
            delay: StdDuration::from_millis(5),
        };
        let queue = UpdateQueue::new(Arc::clone(&trigger), device);
        trigger.start().unwrap();

        thread::scope(|scope| {
            for producer in 0..PRODUCERS {
                let queue = &queue;
                scope.spawn(move || {
                    for write in 0..WRITES {
                        queue.set_data([(producer, channel_color(write))]);
                        thread::sleep(StdDuration::from_micros(50));
                    }
                });
            }
        });

        assert!(wait_until(StdDuration::from_secs(2), || {
            !queue.has_pending_data() && state.in_flight.load(Ordering::SeqCst) == 0
        }));
        trigger.stop();

        assert_eq!(state.max_in_flight.load(Ordering::SeqCst), 1);
        let updates = state.updates.load(Ordering::SeqCst);
        assert!(updates > 1);
        assert!(updates < PRODUCERS * WRITES);

        let latest = state.latest.lock().unwrap();
        for producer in 0..PRODUCERS {
            assert_eq!(latest.get(&producer), Some(&channel_color(WRITES - 1)));
        }
    }

    #[test]
    fn test_no_updates_after_stop() {
        let trigger = unlimited_trigger();
        let state = Arc::new(SlowDeviceState::default());
        let device = SlowDevice {
            state: Arc::clone(&state),
            delay: StdDuration::from_millis(2),
        };
        let queue = UpdateQueue::new(Arc::clone(&trigger), device);
        trigger.start().unwrap();

        let producing = AtomicBool::new(true);
        thread::scope(|scope| {
            scope.spawn(|| {
                let mut write = 0;
                while producing.load(Ordering::SeqCst) {
                    queue.set_data([(0, channel_color(write))]);
                    write += 1;
                    thread::sleep(StdDuration::from_micros(200));
                }
            });

            assert!(wait_until(StdDuration::from_secs(1), || {
                state.updates.load(Ordering::SeqCst) >= 5
            }));
            trigger.stop();
            // A flush in progress completed before stop returned
            assert_eq!(state.in_flight.load(Ordering::SeqCst), 0);

            let after_stop = state.updates.load(Ordering::SeqCst);
            thread::sleep(StdDuration::from_millis(100));
            assert_eq!(state.updates.load(Ordering::SeqCst), after_stop);

            producing.store(false, Ordering::SeqCst);
        });

        assert!(queue.has_pending_data());
    }
}
