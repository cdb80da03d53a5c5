//! Textures sampled by [`TextureBrush`](crate::brush::TextureBrush).
//!
//! Coordinates passed to a texture are normalized to `0..=1` on both axes.

mod pixel;
pub mod sampler;

use thiserror::Error;

pub use pixel::{
    BytePixels, ByteTexture, ColorFormat, ColorPixels, ColorTexture, FloatPixels, FloatTexture,
    PixelConverter, PixelTexture,
};
pub use sampler::{
    AverageByteSampler, AverageColorSampler, AverageFloatSampler, Sampler, SamplerInfo,
};

use crate::color::Color;
use crate::geometry::{Point, Rectangle, Size};

/// Maximum number of data elements making up one pixel.
pub const MAX_DATA_PER_PIXEL: usize = 4;

/// Errors raised when constructing textures or sampler views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextureError {
    #[error("data per pixel must be at least 1")]
    ZeroDataPerPixel,
    #[error("data per pixel is {0}, at most {MAX_DATA_PER_PIXEL} is supported")]
    TooManyChannels(usize),
    #[error("pixel data has {actual} elements, expected {expected}")]
    DataLength { expected: usize, actual: usize },
    #[error("sampled region does not fit the pixel data")]
    RegionOutOfBounds,
}

pub(crate) const fn check_data_per_pixel(data_per_pixel: usize) -> Result<(), TextureError> {
    if data_per_pixel == 0 {
        return Err(TextureError::ZeroDataPerPixel);
    }
    if data_per_pixel > MAX_DATA_PER_PIXEL {
        return Err(TextureError::TooManyChannels(data_per_pixel));
    }
    Ok(())
}

/// Something a brush can read colors from.
pub trait Texture {
    /// Size in pixels.
    fn size(&self) -> Size;

    /// Color of the pixel nearest to a normalized point.
    fn sample_point(&self, point: Point) -> Color;

    /// Reduced color of a normalized region.
    fn sample_region(&self, region: Rectangle) -> Color;
}

/// Texture without pixels, every sample is transparent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTexture;

impl Texture for EmptyTexture {
    fn size(&self) -> Size {
        Size::default()
    }

    fn sample_point(&self, _point: Point) -> Color {
        Color::TRANSPARENT
    }

    fn sample_region(&self, _region: Rectangle) -> Color {
        Color::TRANSPARENT
    }
}

impl<T: Texture + ?Sized> Texture for &T {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn sample_point(&self, point: Point) -> Color {
        (**self).sample_point(point)
    }

    fn sample_region(&self, region: Rectangle) -> Color {
        (**self).sample_region(region)
    }
}
