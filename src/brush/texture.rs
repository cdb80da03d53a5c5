//! Texture brush.
//!
//! Maps each render target into texture space relative to the bounding
//! rectangle and samples the covered texture region.

use super::{Brush, BrushSettings, RenderTarget};
use crate::color::Color;
use crate::geometry::Rectangle;
use crate::texture::Texture;

#[derive(Debug)]
pub struct TextureBrush<T> {
    texture: T,
    settings: BrushSettings,
}

impl<T: Texture> TextureBrush<T> {
    pub fn new(texture: T) -> Self {
        Self {
            texture,
            settings: BrushSettings::new(),
        }
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }

    pub fn set_texture(&mut self, texture: T) {
        self.texture = texture;
    }
}

impl<T: Texture> Brush for TextureBrush<T> {
    fn color_at(&self, rectangle: &Rectangle, target: &RenderTarget) -> Color {
        self.texture
            .sample_region(target.rectangle.normalized_to(*rectangle))
    }

    fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut BrushSettings {
        &mut self.settings
    }
}
