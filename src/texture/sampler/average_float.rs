use super::{Sampler, SamplerInfo, sum_lanes, sum_scalar, uses_lanes};
use crate::texture::MAX_DATA_PER_PIXEL;

/// Unweighted per-channel mean of `f32` pixel data.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageFloatSampler;

impl Sampler<f32> for AverageFloatSampler {
    #[allow(clippy::cast_precision_loss)]
    fn sample(&self, info: &SamplerInfo<'_, f32>, out: &mut [f32]) {
        let count = info.pixel_count();
        if count == 0 {
            out.fill(0.0);
            return;
        }

        let mut sums = [0.0f32; MAX_DATA_PER_PIXEL];
        if uses_lanes(info.width() * info.data_per_pixel(), info.data_per_pixel()) {
            sum_lanes(info, &mut sums);
        } else {
            sum_scalar(info, &mut sums);
        }

        let count = count as f32;
        for (value, sum) in out.iter_mut().zip(sums) {
            *value = sum / count;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::color::TOLERANCE;
    use crate::texture::sampler::LANES;

    const CHANNELS: usize = 4;

    fn averages(info: &SamplerInfo<'_, f32>, sums: [f32; MAX_DATA_PER_PIXEL]) -> [f32; 4] {
        let count = info.pixel_count() as f32;
        sums.map(|sum| sum / count)
    }

    fn both_paths(data: &[f32], width: usize, height: usize) -> ([f32; 4], [f32; 4]) {
        let info = SamplerInfo::new(0, 0, width, height, width, CHANNELS, data).unwrap();
        let mut scalar = [0.0; MAX_DATA_PER_PIXEL];
        let mut lanes = [0.0; MAX_DATA_PER_PIXEL];
        sum_scalar(&info, &mut scalar);
        sum_lanes(&info, &mut lanes);
        (averages(&info, scalar), averages(&info, lanes))
    }

    fn pixels(width: usize, height: usize) -> impl Strategy<Value = Vec<f32>> {
        proptest::collection::vec(0.0f32..=1.0, width * height * CHANNELS)
    }

    proptest! {
        #[test]
        fn lane_sums_match_scalar_sums_above_threshold(data in pixels(13, 7)) {
            // 13 pixels * 4 channels = 52 elements: 3 lane blocks plus a tail
            let (scalar, lanes) = both_paths(&data, 13, 7);
            for (a, b) in scalar.iter().zip(lanes) {
                prop_assert!((a - b).abs() < TOLERANCE, "{} vs {}", a, b);
            }
        }

        #[test]
        fn lane_sums_match_scalar_sums_below_threshold(data in pixels(LANES / CHANNELS - 1, 5)) {
            let width = LANES / CHANNELS - 1;
            let (scalar, lanes) = both_paths(&data, width, 5);
            for (a, b) in scalar.iter().zip(lanes) {
                prop_assert!((a - b).abs() < TOLERANCE, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn zero_area_region_writes_zeroes() {
        let data = [1.0f32; 16];
        let info = SamplerInfo::new(0, 0, 0, 0, 2, CHANNELS, &data).unwrap();
        let mut out = [0.5f32; CHANNELS];
        AverageFloatSampler.sample(&info, &mut out);
        assert_eq!(out, [0.0; CHANNELS]);
    }
}
