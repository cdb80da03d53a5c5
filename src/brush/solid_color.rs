//! Solid color brush.
//!
//! Produces the same color for every render target.

use super::{Brush, BrushSettings, RenderTarget};
use crate::color::Color;
use crate::geometry::Rectangle;

#[derive(Debug, Default)]
pub struct SolidColorBrush {
    color: Color,
    settings: BrushSettings,
}

impl SolidColorBrush {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            settings: BrushSettings::new(),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl Brush for SolidColorBrush {
    fn color_at(&self, _rectangle: &Rectangle, _target: &RenderTarget) -> Color {
        self.color
    }

    fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut BrushSettings {
        &mut self.settings
    }
}
