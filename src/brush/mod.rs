//! Brushes compute one color per render target.
//!
//! Rendering runs three stages per target:
//! 1. the brush computes a raw color ([`Brush::color_at`])
//! 2. enabled decorators rewrite it in order
//! 3. brightness and opacity are applied
//!
//! [`Brush::render`] is lazy: each call to `next` computes one target.

mod solid_color;
mod texture;

use alloc::boxed::Box;

use embassy_time::Instant;

pub use solid_color::SolidColorBrush;
pub use texture::TextureBrush;

use crate::color::Color;
use crate::decorator::{BrushDecorator, DecoratorId, Decorators};
use crate::geometry::{Point, Rectangle};

/// Opaque LED identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedId(pub u32);

/// A logical addressable point a brush produces a color for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    pub led: LedId,
    pub rectangle: Rectangle,
}

impl RenderTarget {
    pub const fn new(led: LedId, rectangle: Rectangle) -> Self {
        Self { led, rectangle }
    }

    pub fn center(&self) -> Point {
        self.rectangle.center()
    }
}

/// State shared by every brush.
///
/// `brightness` and `opacity` are not clamped when set, values outside
/// `0..=1` are clamped when a color is finalized.
#[derive(Debug)]
pub struct BrushSettings {
    /// Scales the HSV value of rendered colors.
    pub brightness: f32,
    /// Scales the alpha of rendered colors.
    pub opacity: f32,
    decorators: Decorators,
}

impl BrushSettings {
    pub const fn new() -> Self {
        Self {
            brightness: 1.0,
            opacity: 1.0,
            decorators: Decorators::new(),
        }
    }

    pub fn decorators(&self) -> &Decorators {
        &self.decorators
    }

    pub fn decorators_mut(&mut self) -> &mut Decorators {
        &mut self.decorators
    }

    /// Apply decorators to a raw brush color.
    pub fn decorate(&self, rectangle: &Rectangle, target: &RenderTarget, color: &mut Color) {
        if self.decorators.is_empty() {
            return;
        }
        self.decorators.apply(rectangle, target, color);
    }

    /// Apply brightness and opacity.
    pub fn finalize(&self, mut color: Color) -> Color {
        if self.brightness < 1.0 {
            color = color.scale_value(self.brightness.clamp(0.0, 1.0));
        }
        if self.opacity < 1.0 {
            color = color.multiply_alpha(self.opacity.clamp(0.0, 1.0));
        }
        color
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Brush {
    /// Raw color for `target` inside the bounding `rectangle`.
    fn color_at(&self, rectangle: &Rectangle, target: &RenderTarget) -> Color;

    fn settings(&self) -> &BrushSettings;

    fn settings_mut(&mut self) -> &mut BrushSettings;

    /// Run the whole pipeline for one target.
    fn render_target(&self, rectangle: &Rectangle, target: &RenderTarget) -> Color {
        let settings = self.settings();
        let mut color = self.color_at(rectangle, target);
        settings.decorate(rectangle, target, &mut color);
        settings.finalize(color)
    }

    /// Lazily render `targets` inside the bounding `rectangle`.
    ///
    /// Yields `(target, color)` in input order. Call again to restart.
    fn render<'a, I>(&'a self, rectangle: Rectangle, targets: I) -> Render<'a, Self, I::IntoIter>
    where
        Self: Sized,
        I: IntoIterator<Item = &'a RenderTarget>,
    {
        Render {
            brush: self,
            rectangle,
            targets: targets.into_iter(),
        }
    }

    /// Advance time-based decorators.
    fn tick(&mut self, now: Instant) {
        self.settings_mut().decorators_mut().tick(now);
    }

    fn attach_decorator(
        &mut self,
        decorator: Box<dyn BrushDecorator>,
    ) -> Result<DecoratorId, Box<dyn BrushDecorator>> {
        self.settings_mut().decorators_mut().attach(decorator)
    }

    fn detach_decorator(&mut self, id: DecoratorId) -> Option<Box<dyn BrushDecorator>> {
        self.settings_mut().decorators_mut().detach(id)
    }
}

impl<B: Brush + ?Sized> Brush for Box<B> {
    fn color_at(&self, rectangle: &Rectangle, target: &RenderTarget) -> Color {
        (**self).color_at(rectangle, target)
    }

    fn settings(&self) -> &BrushSettings {
        (**self).settings()
    }

    fn settings_mut(&mut self) -> &mut BrushSettings {
        (**self).settings_mut()
    }

    fn render_target(&self, rectangle: &Rectangle, target: &RenderTarget) -> Color {
        (**self).render_target(rectangle, target)
    }

    fn tick(&mut self, now: Instant) {
        (**self).tick(now);
    }
}

/// Lazy render pass returned by [`Brush::render`].
#[derive(Debug, Clone)]
pub struct Render<'a, B: ?Sized, I> {
    brush: &'a B,
    rectangle: Rectangle,
    targets: I,
}

impl<'a, B, I> Iterator for Render<'a, B, I>
where
    B: Brush + ?Sized,
    I: Iterator<Item = &'a RenderTarget>,
{
    type Item = (&'a RenderTarget, Color);

    fn next(&mut self) -> Option<Self::Item> {
        let target = self.targets.next()?;
        Some((target, self.brush.render_target(&self.rectangle, target)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.targets.size_hint()
    }
}

impl<'a, B, I> ExactSizeIterator for Render<'a, B, I>
where
    B: Brush + ?Sized,
    I: ExactSizeIterator<Item = &'a RenderTarget>,
{
}
