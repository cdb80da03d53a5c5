use super::{LANES, Sampler, SamplerInfo, VECTOR_ACCELERATED};
use crate::color::Color;
use crate::texture::MAX_DATA_PER_PIXEL;

/// Colors accumulated per lane block, four channels each.
const LANE_COLORS: usize = LANES / 4;

type ChannelSums = [[f32; 4]; MAX_DATA_PER_PIXEL];

/// Unweighted per-channel mean of [`Color`] pixel data.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageColorSampler;

impl Sampler<Color> for AverageColorSampler {
    #[allow(clippy::cast_precision_loss)]
    fn sample(&self, info: &SamplerInfo<'_, Color>, out: &mut [Color]) {
        let count = info.pixel_count();
        if count == 0 {
            out.fill(Color::TRANSPARENT);
            return;
        }

        let sums = if uses_color_lanes(info.width(), info.data_per_pixel()) {
            sum_lanes(info)
        } else {
            sum_scalar(info)
        };

        let count = count as f32;
        for (value, [a, r, g, b]) in out.iter_mut().zip(sums) {
            *value = Color::from_argb_f32(a / count, r / count, g / count, b / count);
        }
    }
}

const fn uses_color_lanes(width: usize, data_per_pixel: usize) -> bool {
    VECTOR_ACCELERATED
        && LANE_COLORS % data_per_pixel == 0
        && width * data_per_pixel >= LANE_COLORS
}

fn add_color(sum: &mut [f32; 4], color: Color) {
    for (channel, value) in sum.iter_mut().zip(color.to_array()) {
        *channel += value;
    }
}

fn sum_scalar(info: &SamplerInfo<'_, Color>) -> ChannelSums {
    let channels = info.data_per_pixel();
    let mut sums = ChannelSums::default();
    for row in info.rows() {
        for pixel in row.chunks_exact(channels) {
            for (sum, &color) in sums.iter_mut().zip(pixel) {
                add_color(sum, color);
            }
        }
    }
    sums
}

fn sum_lanes(info: &SamplerInfo<'_, Color>) -> ChannelSums {
    let channels = info.data_per_pixel();
    let mut sums = ChannelSums::default();
    let mut lanes = [0.0f32; LANES];

    for row in info.rows() {
        let mut blocks = row.chunks_exact(LANE_COLORS);
        for block in &mut blocks {
            for (lane, &color) in lanes.chunks_exact_mut(4).zip(block) {
                for (channel, value) in lane.iter_mut().zip(color.to_array()) {
                    *channel += value;
                }
            }
        }
        for (index, &color) in blocks.remainder().iter().enumerate() {
            add_color(&mut sums[index % channels], color);
        }
    }

    for (index, lane) in lanes.chunks_exact(4).enumerate() {
        for (channel, value) in sums[index % channels].iter_mut().zip(lane) {
            *channel += value;
        }
    }
    sums
}
