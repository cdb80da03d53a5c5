#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod brush;
pub mod color;
pub mod decorator;
pub mod geometry;
pub mod texture;

#[cfg(feature = "std")]
pub mod device;
#[cfg(feature = "std")]
pub mod queue;
#[cfg(feature = "std")]
pub mod trigger;

pub use brush::{Brush, BrushSettings, LedId, RenderTarget, SolidColorBrush, TextureBrush};
pub use color::{Color, ParseColorError, RGB8};
pub use decorator::{BrushDecorator, ColorCorrectionDecorator, DecoratorId, FlashDecorator};
pub use geometry::{Point, Rectangle, Size};
pub use texture::{ByteTexture, ColorTexture, FloatTexture, Texture, TextureError};

#[cfg(feature = "std")]
pub use device::{LedStripConfig, LedStripDevice};
#[cfg(feature = "std")]
pub use queue::{FlushError, UpdateDevice, UpdateQueue};
#[cfg(feature = "std")]
pub use trigger::{
    DeviceUpdateTrigger, DeviceUpdateTriggerConfig, ManualUpdateTrigger, UpdateKind,
    UpdateListener, UpdateTrigger,
};

pub use embassy_time::{Duration, Instant};
