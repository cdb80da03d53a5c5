//! Brush decorators.
//!
//! Decorators post-process the color a brush computed for a render target,
//! before brightness and opacity are applied. They run once per LED per frame,
//! so `manipulate_color` must not allocate.

mod color_correction;
mod flash;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use embassy_time::Instant;
use heapless::Vec as FixedVec;

pub use color_correction::ColorCorrectionDecorator;
pub use flash::{FlashDecorator, FlashTimings};

use crate::brush::RenderTarget;
use crate::color::Color;
use crate::geometry::Rectangle;

/// Maximum number of decorators attached to one brush.
pub const MAX_DECORATORS: usize = 8;

pub trait BrushDecorator: Send {
    /// Rewrite `color` computed for `target` inside `rectangle`.
    fn manipulate_color(&self, rectangle: &Rectangle, target: &RenderTarget, color: &mut Color);

    /// Disabled decorators are skipped.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Lower orders run first.
    fn order(&self) -> i32 {
        0
    }

    /// Advance time-based state.
    fn tick(&mut self, _now: Instant) {}

    fn on_attached(&mut self) {}

    fn on_detached(&mut self) {}
}

/// Handle of an attached decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoratorId(u32);

/// Ordered, fixed-capacity decorator list owned by one brush.
///
/// Attaching moves the decorator in, detaching hands it back, so a decorator
/// is never attached to two owners.
pub struct Decorators {
    entries: FixedVec<(DecoratorId, Box<dyn BrushDecorator>), MAX_DECORATORS>,
    next_id: u32,
}

impl Decorators {
    pub const fn new() -> Self {
        Self {
            entries: FixedVec::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach a decorator.
    ///
    /// It runs after every attached decorator of the same or lower order.
    /// Returns the decorator if the list is full.
    pub fn attach(
        &mut self,
        mut decorator: Box<dyn BrushDecorator>,
    ) -> Result<DecoratorId, Box<dyn BrushDecorator>> {
        if self.entries.is_full() {
            return Err(decorator);
        }

        let id = DecoratorId(self.next_id);
        let position = self
            .entries
            .iter()
            .position(|(_, attached)| attached.order() > decorator.order())
            .unwrap_or(self.entries.len());

        decorator.on_attached();
        self.entries
            .insert(position, (id, decorator))
            .map_err(|(_, decorator)| decorator)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Detach a decorator and hand it back.
    pub fn detach(&mut self, id: DecoratorId) -> Option<Box<dyn BrushDecorator>> {
        let position = self.entries.iter().position(|(entry, _)| *entry == id)?;
        let (_, mut decorator) = self.entries.remove(position);
        decorator.on_detached();
        Some(decorator)
    }

    /// Detach every decorator, in run order.
    pub fn detach_all(&mut self) -> Vec<Box<dyn BrushDecorator>> {
        let mut detached = Vec::with_capacity(self.entries.len());
        for (_, mut decorator) in core::mem::take(&mut self.entries) {
            decorator.on_detached();
            detached.push(decorator);
        }
        detached
    }

    /// Run every enabled decorator in order.
    pub fn apply(&self, rectangle: &Rectangle, target: &RenderTarget, color: &mut Color) {
        for (_, decorator) in &self.entries {
            if decorator.is_enabled() {
                decorator.manipulate_color(rectangle, target, color);
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        for (_, decorator) in &mut self.entries {
            decorator.tick(now);
        }
    }
}

impl Default for Decorators {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decorators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorators")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
