//! Flash decorator.
//!
//! Pulses the alpha of decorated colors with an attack / sustain / decay /
//! release envelope. The envelope advances on [`BrushDecorator::tick`].

use embassy_time::{Duration, Instant};

use super::BrushDecorator;
use crate::brush::RenderTarget;
use crate::color::Color;
use crate::geometry::Rectangle;

const DEFAULT_ATTACK_MS: u64 = 200;
const DEFAULT_SUSTAIN_MS: u64 = 300;
const DEFAULT_DECAY_MS: u64 = 200;
const DEFAULT_RELEASE_MS: u64 = 300;

/// Phase durations of one flash.
#[derive(Debug, Clone, Copy)]
pub struct FlashTimings {
    /// Rise from min to max.
    pub attack: Duration,
    /// Hold at max.
    pub sustain: Duration,
    /// Fall from max to min.
    pub decay: Duration,
    /// Hold at min before the next flash.
    pub release: Duration,
}

impl Default for FlashTimings {
    fn default() -> Self {
        Self {
            attack: Duration::from_millis(DEFAULT_ATTACK_MS),
            sustain: Duration::from_millis(DEFAULT_SUSTAIN_MS),
            decay: Duration::from_millis(DEFAULT_DECAY_MS),
            release: Duration::from_millis(DEFAULT_RELEASE_MS),
        }
    }
}

impl FlashTimings {
    fn cycle(&self) -> u64 {
        self.attack.as_micros()
            + self.sustain.as_micros()
            + self.decay.as_micros()
            + self.release.as_micros()
    }
}

/// Alpha envelope decorator.
#[derive(Debug, Clone)]
pub struct FlashDecorator {
    timings: FlashTimings,
    min: f32,
    max: f32,
    /// Number of flashes, 0 = forever.
    repetitions: u32,
    started: Option<Instant>,
    current: f32,
    finished: bool,
}

impl FlashDecorator {
    pub fn new(timings: FlashTimings) -> Self {
        Self {
            timings,
            min: 0.0,
            max: 1.0,
            repetitions: 0,
            started: None,
            current: 0.0,
            finished: false,
        }
    }

    /// Limit the number of flashes.
    #[must_use]
    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the alpha factor range of the envelope.
    #[must_use]
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self.current = min;
        self
    }

    /// Current alpha factor.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Returns `true` once all repetitions ran.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Restart the envelope on the next tick.
    pub fn restart(&mut self) {
        self.started = None;
        self.finished = false;
        self.current = self.min;
    }

    #[allow(clippy::cast_precision_loss)]
    fn envelope(&self, position: u64) -> f32 {
        let attack = self.timings.attack.as_micros();
        let sustain = self.timings.sustain.as_micros();
        let decay = self.timings.decay.as_micros();
        let span = self.max - self.min;

        if position < attack {
            self.min + (span * (position as f32 / attack as f32))
        } else if position < attack + sustain {
            self.max
        } else if position < attack + sustain + decay {
            let progress = (position - attack - sustain) as f32 / decay as f32;
            self.max - (span * progress)
        } else {
            self.min
        }
    }
}

impl Default for FlashDecorator {
    fn default() -> Self {
        Self::new(FlashTimings::default())
    }
}

impl BrushDecorator for FlashDecorator {
    fn manipulate_color(&self, _rectangle: &Rectangle, _target: &RenderTarget, color: &mut Color) {
        *color = color.multiply_alpha(self.current);
    }

    fn is_enabled(&self) -> bool {
        !self.finished
    }

    fn tick(&mut self, now: Instant) {
        if self.finished {
            return;
        }
        let started = *self.started.get_or_insert(now);
        let elapsed = now
            .checked_duration_since(started)
            .map_or(0, |elapsed| elapsed.as_micros());

        let cycle = self.timings.cycle();
        if cycle == 0 {
            self.current = self.max;
            return;
        }

        if self.repetitions > 0 && elapsed / cycle >= u64::from(self.repetitions) {
            self.finished = true;
            return;
        }
        self.current = self.envelope(elapsed % cycle);
    }

    fn on_attached(&mut self) {
        self.restart();
    }
}
