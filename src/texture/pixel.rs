//! Pixel grid textures.

use alloc::vec::Vec;

use super::{
    AverageByteSampler, AverageColorSampler, AverageFloatSampler, MAX_DATA_PER_PIXEL, Sampler,
    SamplerInfo, Texture, TextureError, check_data_per_pixel,
};
use crate::color::Color;
use crate::geometry::{Point, Rectangle, Size};

/// Converts the data elements of one pixel into a [`Color`].
pub trait PixelConverter<T> {
    /// Number of data elements per pixel.
    fn data_per_pixel(&self) -> usize;

    /// `pixel` holds exactly `data_per_pixel` elements.
    fn to_color(&self, pixel: &[T]) -> Color;
}

/// One [`Color`] per pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorPixels;

impl PixelConverter<Color> for ColorPixels {
    fn data_per_pixel(&self) -> usize {
        1
    }

    fn to_color(&self, pixel: &[Color]) -> Color {
        pixel[0]
    }
}

/// Channel order of byte pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFormat {
    Rgb,
    Bgr,
    #[default]
    Rgba,
    Bgra,
    Argb,
}

impl ColorFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra | Self::Argb => 4,
        }
    }
}

/// Byte pixels in a given [`ColorFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BytePixels {
    pub format: ColorFormat,
}

impl PixelConverter<u8> for BytePixels {
    fn data_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    fn to_color(&self, pixel: &[u8]) -> Color {
        match self.format {
            ColorFormat::Rgb => Color::from_rgb_u8(pixel[0], pixel[1], pixel[2]),
            ColorFormat::Bgr => Color::from_rgb_u8(pixel[2], pixel[1], pixel[0]),
            ColorFormat::Rgba => Color::from_argb_u8(pixel[3], pixel[0], pixel[1], pixel[2]),
            ColorFormat::Bgra => Color::from_argb_u8(pixel[3], pixel[2], pixel[1], pixel[0]),
            ColorFormat::Argb => Color::from_argb_u8(pixel[0], pixel[1], pixel[2], pixel[3]),
        }
    }
}

/// RGBA `f32` pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatPixels;

impl PixelConverter<f32> for FloatPixels {
    fn data_per_pixel(&self) -> usize {
        4
    }

    fn to_color(&self, pixel: &[f32]) -> Color {
        Color::from_argb_f32(pixel[3], pixel[0], pixel[1], pixel[2])
    }
}

/// Texture backed by a row-major pixel buffer.
///
/// Region samples are reduced by the sampler `S`, single pixels are converted
/// directly.
#[derive(Debug, Clone)]
pub struct PixelTexture<T, C, S> {
    width: usize,
    height: usize,
    data_per_pixel: usize,
    data: Vec<T>,
    converter: C,
    sampler: S,
}

/// Texture of [`Color`] pixels averaged by [`AverageColorSampler`].
pub type ColorTexture = PixelTexture<Color, ColorPixels, AverageColorSampler>;

/// Texture of byte pixels averaged by [`AverageByteSampler`].
pub type ByteTexture = PixelTexture<u8, BytePixels, AverageByteSampler>;

/// Texture of RGBA float pixels averaged by [`AverageFloatSampler`].
pub type FloatTexture = PixelTexture<f32, FloatPixels, AverageFloatSampler>;

impl<T, C, S> PixelTexture<T, C, S>
where
    T: Copy + Default,
    C: PixelConverter<T>,
    S: Sampler<T>,
{
    /// Create a texture.
    ///
    /// Fails if the converter's pixel layout is unsupported or `data` does
    /// not hold exactly `width * height` pixels.
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<T>,
        converter: C,
        sampler: S,
    ) -> Result<Self, TextureError> {
        let data_per_pixel = converter.data_per_pixel();
        check_data_per_pixel(data_per_pixel)?;

        let expected = width * height * data_per_pixel;
        if data.len() != expected {
            return Err(TextureError::DataLength {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data_per_pixel,
            data,
            converter,
            sampler,
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn pixel(&self, x: usize, y: usize) -> &[T] {
        let start = ((y * self.width) + x) * self.data_per_pixel;
        &self.data[start..start + self.data_per_pixel]
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl ColorTexture {
    pub fn from_colors(width: usize, height: usize, data: Vec<Color>) -> Result<Self, TextureError> {
        Self::new(width, height, data, ColorPixels, AverageColorSampler)
    }
}

impl ByteTexture {
    pub fn from_bytes(
        width: usize,
        height: usize,
        data: Vec<u8>,
        format: ColorFormat,
    ) -> Result<Self, TextureError> {
        Self::new(width, height, data, BytePixels { format }, AverageByteSampler)
    }
}

impl FloatTexture {
    pub fn from_floats(width: usize, height: usize, data: Vec<f32>) -> Result<Self, TextureError> {
        Self::new(width, height, data, FloatPixels, AverageFloatSampler)
    }
}

/// Nearest index for a normalized coordinate on an axis of `len` pixels.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn nearest_index(len: usize, coordinate: f32) -> usize {
    libm::roundf((len - 1) as f32 * coordinate.clamp(0.0, 1.0)) as usize
}

/// Pixel extent for a normalized size on an axis of `len` pixels.
///
/// A requested size above zero never vanishes to zero pixels.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn extent(len: usize, start: usize, size: f32) -> usize {
    let mut extent = libm::roundf(len as f32 * size.clamp(0.0, 1.0)) as usize;
    if extent == 0 && size > 0.0 {
        extent = 1;
    }
    extent.min(len - start)
}

impl<T, C, S> Texture for PixelTexture<T, C, S>
where
    T: Copy + Default,
    C: PixelConverter<T>,
    S: Sampler<T>,
{
    #[allow(clippy::cast_precision_loss)]
    fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    fn sample_point(&self, point: Point) -> Color {
        if self.is_empty() {
            return Color::TRANSPARENT;
        }
        let x = nearest_index(self.width, point.x);
        let y = nearest_index(self.height, point.y);
        self.converter.to_color(self.pixel(x, y))
    }

    fn sample_region(&self, region: Rectangle) -> Color {
        if self.is_empty() {
            return Color::TRANSPARENT;
        }

        let x = nearest_index(self.width, region.location.x);
        let y = nearest_index(self.height, region.location.y);
        let width = extent(self.width, x, region.size.width);
        let height = extent(self.height, y, region.size.height);

        if width == 0 || height == 0 {
            return Color::TRANSPARENT;
        }
        if width == 1 && height == 1 {
            return self.converter.to_color(self.pixel(x, y));
        }

        let info = SamplerInfo::from_parts(
            x,
            y,
            width,
            height,
            self.width,
            self.data_per_pixel,
            &self.data,
        );
        let mut buffer = [T::default(); MAX_DATA_PER_PIXEL];
        let pixel = &mut buffer[..self.data_per_pixel];
        self.sampler.sample(&info, pixel);
        self.converter.to_color(pixel)
    }
}
