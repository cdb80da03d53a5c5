mod tests {
    use std::sync::Arc;

    use light_pacer::color::{Color, RGB8};
    use light_pacer::device::{LedStripConfig, LedStripDevice, StripError};
    use light_pacer::queue::{UpdateDevice, UpdateQueue};
    use light_pacer::trigger::{ManualUpdateTrigger, UpdateTrigger};
    use smart_leds::SmartLedsWrite;

    const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
    const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

    /// Keeps every written frame
    #[derive(Default)]
    struct FrameWriter {
        frames: Vec<Vec<RGB8>>,
        fail: bool,
    }

    impl SmartLedsWrite for FrameWriter {
        type Error = &'static str;
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            if self.fail {
                return Err("bus error");
            }
            self.frames.push(iterator.into_iter().map(Into::into).collect());
            Ok(())
        }
    }

    fn strip(len: usize) -> LedStripDevice<FrameWriter> {
        LedStripDevice::new(FrameWriter::default(), LedStripConfig::new(len))
    }

    fn last_frame(device: &LedStripDevice<FrameWriter>) -> Vec<RGB8> {
        device.writer().frames.last().cloned().unwrap_or_default()
    }

    #[test]
    fn test_update_writes_full_frame() {
        let mut device = strip(3);
        let red = Color::from_rgb_f32(1.0, 0.0, 0.0);

        device.update(&[(1, red)]).unwrap();
        assert_eq!(last_frame(&device), vec![OFF, RED, OFF]);

        device.update(&[(2, red)]).unwrap();
        assert_eq!(last_frame(&device), vec![OFF, RED, RED]);
        assert_eq!(device.writer().frames.len(), 2);
    }

    #[test]
    fn test_translucent_colors_fade_to_black() {
        let mut device = strip(1);
        device.update(&[(0, Color::WHITE.set_alpha(0.5))]).unwrap();
        assert_eq!(device.frame(), &[RGB8 {
            r: 128,
            g: 128,
            b: 128
        }]);

        device.update(&[(0, Color::TRANSPARENT)]).unwrap();
        assert_eq!(device.frame(), &[OFF]);
    }

    #[test]
    fn test_brightness_and_gamma() {
        let mut device = LedStripDevice::new(FrameWriter::default(), LedStripConfig {
            len: 1,
            brightness: 128,
            gamma: false,
        });
        device.update(&[(0, Color::WHITE)]).unwrap();
        assert_eq!(last_frame(&device)[0].r, 128);
        // Brightness is applied on write only
        assert_eq!(device.frame()[0].r, 255);

        device.set_brightness(255);
        device.set_gamma(true);
        device.update(&[(0, Color::from_rgb_u8(128, 255, 0))]).unwrap();
        let written = last_frame(&device)[0];
        assert!(written.r < 128);
        assert_eq!(written.g, 255);
        assert_eq!(written.b, 0);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut device = strip(2);
        let red = Color::from_rgb_f32(1.0, 0.0, 0.0);

        assert_eq!(
            device.update(&[(0, red), (5, red)]),
            Err(StripError::IndexOutOfRange { index: 5, len: 2 })
        );
        // Valid entries are still written
        assert_eq!(last_frame(&device), vec![RED, OFF]);
    }

    #[test]
    fn test_write_failure() {
        let mut device = strip(1);
        device.writer_mut().fail = true;
        assert_eq!(
            device.heartbeat(),
            Err(StripError::Write("\"bus error\"".to_owned()))
        );
    }

    #[test]
    fn test_clear() {
        let mut device = strip(2);
        device.update(&[(0, Color::WHITE), (1, Color::WHITE)]).unwrap();
        device.clear();
        device.flush().unwrap();
        assert_eq!(last_frame(&device), vec![OFF, OFF]);
    }

    #[test]
    fn test_strip_behind_queue() {
        let trigger = Arc::new(ManualUpdateTrigger::new());
        let queue = UpdateQueue::new(Arc::clone(&trigger), strip(4));

        trigger.start().unwrap();
        assert_eq!(
            queue.with_device(|device| last_frame(device)),
            vec![OFF; 4]
        );

        queue.set_data((0..4).map(|index| (index, Color::WHITE)));
        queue.set_data([(3, Color::from_rgb_f32(1.0, 0.0, 0.0))]);
        trigger.trigger_update();

        let white = RGB8 {
            r: 255,
            g: 255,
            b: 255,
        };
        assert_eq!(
            queue.with_device(|device| last_frame(device)),
            vec![white, white, white, RED]
        );
        assert_eq!(queue.failed_flushes(), 0);

        trigger.trigger_heartbeat();
        assert_eq!(queue.with_device(|device| device.writer().frames.len()), 3);
    }
}
