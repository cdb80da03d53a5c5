//! Addressable LED strip backend.
//!
//! Keeps a full frame of the strip and rewrites it through any
//! [`SmartLedsWrite`] driver whenever the queue flushes. Identifiers are strip
//! indices.

use core::fmt::Debug;

use smart_leds::{RGB8, SmartLedsWrite, brightness, gamma};
use thiserror::Error;

use crate::color::Color;
use crate::queue::UpdateDevice;

/// Full brightness.
pub const DEFAULT_BRIGHTNESS: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedStripConfig {
    /// Number of LEDs on the strip.
    pub len: usize,
    /// Global brightness applied on write.
    pub brightness: u8,
    /// Apply the WS2812 gamma curve on write.
    pub gamma: bool,
}

impl LedStripConfig {
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            brightness: DEFAULT_BRIGHTNESS,
            gamma: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StripError {
    #[error("led index {index} is out of range for a strip of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("strip write failed: {0}")]
    Write(String),
}

pub struct LedStripDevice<W> {
    writer: W,
    frame: Vec<RGB8>,
    brightness: u8,
    gamma: bool,
}

impl<W> LedStripDevice<W>
where
    W: SmartLedsWrite,
    W::Error: Debug,
    RGB8: Into<W::Color>,
{
    /// Create a backend with every LED off.
    pub fn new(writer: W, config: LedStripConfig) -> Self {
        Self {
            writer,
            frame: vec![RGB8::default(); config.len],
            brightness: config.brightness,
            gamma: config.gamma,
        }
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Last colors handed to the writer, before brightness and gamma.
    pub fn frame(&self) -> &[RGB8] {
        &self.frame
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Applied from the next flush.
    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    pub fn set_gamma(&mut self, gamma: bool) {
        self.gamma = gamma;
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Turn every LED off, applied on the next flush.
    pub fn clear(&mut self) {
        self.frame.fill(RGB8::default());
    }

    /// Write the whole frame to the strip.
    pub fn flush(&mut self) -> Result<(), StripError> {
        let pixels = self.frame.iter().copied();
        let result = if self.gamma {
            self.writer.write(brightness(gamma(pixels), self.brightness))
        } else {
            self.writer.write(brightness(pixels, self.brightness))
        };
        result.map_err(|err| StripError::Write(format!("{err:?}")))
    }
}

/// Strips have no alpha, translucent colors are composited over black.
fn to_strip_color(color: Color) -> RGB8 {
    Color::BLACK.blend(color).to_rgb8()
}

impl<W> UpdateDevice for LedStripDevice<W>
where
    W: SmartLedsWrite + Send + 'static,
    W::Error: Debug,
    RGB8: Into<W::Color>,
{
    type Identifier = usize;
    type Error = StripError;

    fn on_starting(&mut self) -> Result<(), StripError> {
        self.flush()
    }

    /// Out-of-range entries are skipped and reported after the write.
    fn update(&mut self, batch: &[(usize, Color)]) -> Result<(), StripError> {
        let len = self.frame.len();
        let mut out_of_range = None;

        for &(index, color) in batch {
            match self.frame.get_mut(index) {
                Some(pixel) => *pixel = to_strip_color(color),
                None => {
                    out_of_range.get_or_insert(StripError::IndexOutOfRange { index, len });
                }
            }
        }

        self.flush()?;
        out_of_range.map_or(Ok(()), Err)
    }

    fn heartbeat(&mut self) -> Result<(), StripError> {
        self.flush()
    }
}
