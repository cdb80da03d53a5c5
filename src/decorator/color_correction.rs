//! Color correction decorator.
//!
//! Applies multiplicative color correction to each RGB channel.
//! Used for white balance and color temperature adjustments.

use super::BrushDecorator;
use crate::brush::RenderTarget;
use crate::color::{Color, RGB8};
use crate::geometry::Rectangle;

/// Per-channel multiplicative correction.
#[derive(Debug, Clone, Copy)]
pub struct ColorCorrectionDecorator {
    /// Correction factors for R, G and B (`1.0` = unchanged).
    factors: [f32; 3],
    enabled: bool,
}

impl ColorCorrectionDecorator {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            factors: [r, g, b],
            enabled: true,
        }
    }

    /// Create from byte factors (0-255 = 0%-100%).
    pub fn from_rgb8(factors: RGB8) -> Self {
        Self::new(
            f32::from(factors.r) / 255.0,
            f32::from(factors.g) / 255.0,
            f32::from(factors.b) / 255.0,
        )
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if correction changes anything.
    #[allow(clippy::float_cmp)]
    pub fn is_active(&self) -> bool {
        self.factors != [1.0; 3]
    }
}

impl BrushDecorator for ColorCorrectionDecorator {
    fn manipulate_color(&self, _rectangle: &Rectangle, _target: &RenderTarget, color: &mut Color) {
        if !self.is_active() {
            return;
        }
        let [r, g, b] = self.factors;
        *color = color.multiply_rgb(r, g, b);
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
