//! Region samplers.
//!
//! A sampler reduces a rectangular region of pixel data to a single pixel.
//! The averaging samplers accumulate channel sums in fixed-width lanes when
//! the target has vector registers, and fall back to a plain per-pixel loop
//! otherwise. Both paths agree within [`TOLERANCE`](crate::color::TOLERANCE).

mod average_byte;
mod average_color;
mod average_float;

use core::ops::AddAssign;

pub use average_byte::AverageByteSampler;
pub use average_color::AverageColorSampler;
pub use average_float::AverageFloatSampler;

use super::{MAX_DATA_PER_PIXEL, TextureError, check_data_per_pixel};

/// `true` when the target has vector registers the lane loops compile to.
pub(crate) const VECTOR_ACCELERATED: bool = cfg!(any(
    target_feature = "sse2",
    target_feature = "neon",
    target_feature = "simd128"
));

/// Number of data elements accumulated per lane block.
pub(crate) const LANES: usize = 16;

/// Reduces a region of pixel data to one pixel.
pub trait Sampler<T> {
    /// Write the reduced pixel into `out`.
    ///
    /// `out` holds exactly `info.data_per_pixel()` elements. A region without
    /// pixels writes zeroes.
    fn sample(&self, info: &SamplerInfo<'_, T>, out: &mut [T]);
}

/// Borrowed view over a rectangular region of a row-major pixel buffer.
#[derive(Debug, Clone, Copy)]
pub struct SamplerInfo<'a, T> {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    stride: usize,
    data_per_pixel: usize,
    data: &'a [T],
}

impl<'a, T> SamplerInfo<'a, T> {
    /// Create a view over `data`.
    ///
    /// `stride` is the width of the full buffer in pixels.
    pub fn new(
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        stride: usize,
        data_per_pixel: usize,
        data: &'a [T],
    ) -> Result<Self, TextureError> {
        check_data_per_pixel(data_per_pixel)?;
        if x + width > stride {
            return Err(TextureError::RegionOutOfBounds);
        }
        if width > 0 && height > 0 {
            let end = ((((y + height) - 1) * stride) + x + width) * data_per_pixel;
            if end > data.len() {
                return Err(TextureError::RegionOutOfBounds);
            }
        }
        Ok(Self::from_parts(x, y, width, height, stride, data_per_pixel, data))
    }

    /// Create a view whose bounds the caller already checked.
    pub(crate) const fn from_parts(
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        stride: usize,
        data_per_pixel: usize,
        data: &'a [T],
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            stride,
            data_per_pixel,
            data,
        }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn data_per_pixel(&self) -> usize {
        self.data_per_pixel
    }

    /// Number of pixels in the region.
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Data of one region row, `width * data_per_pixel` elements.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    pub fn row(&self, row: usize) -> &'a [T] {
        assert!(row < self.height, "row {row} out of region height {}", self.height);
        let start = (((self.y + row) * self.stride) + self.x) * self.data_per_pixel;
        &self.data[start..start + (self.width * self.data_per_pixel)]
    }

    /// Iterate over all region rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).map(|row| self.row(row))
    }
}

/// Whether rows of this region are long enough for the lane loop.
pub(crate) const fn uses_lanes(row_len: usize, data_per_pixel: usize) -> bool {
    VECTOR_ACCELERATED && LANES % data_per_pixel == 0 && row_len >= LANES
}

/// Per-channel sums with a plain per-pixel loop.
pub(crate) fn sum_scalar<T, A>(info: &SamplerInfo<'_, T>, sums: &mut [A; MAX_DATA_PER_PIXEL])
where
    T: Copy,
    A: Copy + AddAssign + From<T>,
{
    let channels = info.data_per_pixel();
    for row in info.rows() {
        for pixel in row.chunks_exact(channels) {
            for (sum, &value) in sums.iter_mut().zip(pixel) {
                *sum += A::from(value);
            }
        }
    }
}

/// Per-channel sums accumulated in [`LANES`] wide blocks.
///
/// `LANES` must be a multiple of the channel count, so lane `i` always holds
/// channel `i % data_per_pixel`. The tail of each row is drained with a
/// scalar loop.
pub(crate) fn sum_lanes<T, A>(info: &SamplerInfo<'_, T>, sums: &mut [A; MAX_DATA_PER_PIXEL])
where
    T: Copy,
    A: Copy + Default + AddAssign + From<T>,
{
    let channels = info.data_per_pixel();
    let mut lanes = [A::default(); LANES];

    for row in info.rows() {
        let mut blocks = row.chunks_exact(LANES);
        for block in &mut blocks {
            for (lane, &value) in lanes.iter_mut().zip(block) {
                *lane += A::from(value);
            }
        }
        for (index, &value) in blocks.remainder().iter().enumerate() {
            sums[index % channels] += A::from(value);
        }
    }

    for (index, &lane) in lanes.iter().enumerate() {
        sums[index % channels] += lane;
    }
}
