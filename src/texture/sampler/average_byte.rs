use super::{Sampler, SamplerInfo, sum_lanes, sum_scalar, uses_lanes};
use crate::texture::MAX_DATA_PER_PIXEL;

/// Unweighted per-channel mean of `u8` pixel data, rounded to nearest.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageByteSampler;

impl Sampler<u8> for AverageByteSampler {
    #[allow(clippy::cast_possible_truncation)]
    fn sample(&self, info: &SamplerInfo<'_, u8>, out: &mut [u8]) {
        let count = info.pixel_count() as u64;
        if count == 0 {
            out.fill(0);
            return;
        }

        // u32 sums overflow past ~16.8M saturated pixels
        let mut sums = [0u64; MAX_DATA_PER_PIXEL];
        if uses_lanes(info.width() * info.data_per_pixel(), info.data_per_pixel()) {
            sum_lanes(info, &mut sums);
        } else {
            sum_scalar(info, &mut sums);
        }

        for (value, sum) in out.iter_mut().zip(sums) {
            *value = ((sum + (count / 2)) / count) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn lane_sums_equal_scalar_sums(
            data in proptest::collection::vec(any::<u8>(), 17 * 9 * 4),
        ) {
            let info = SamplerInfo::new(0, 0, 17, 9, 17, 4, &data).unwrap();
            let mut scalar = [0u64; MAX_DATA_PER_PIXEL];
            let mut lanes = [0u64; MAX_DATA_PER_PIXEL];
            sum_scalar(&info, &mut scalar);
            sum_lanes(&info, &mut lanes);
            prop_assert_eq!(scalar, lanes);
        }
    }

    #[test]
    fn averages_sub_region_only() {
        // 4x2 gray ramp, sample the right 2x2 block
        let data: Vec<u8> = [10u8, 20, 30, 40, 50, 60, 70, 80]
            .iter()
            .flat_map(|&v| [v, v, v, 255])
            .collect();
        let info = SamplerInfo::new(2, 0, 2, 2, 4, 4, &data).unwrap();
        let mut out = [0u8; 4];
        AverageByteSampler.sample(&info, &mut out);
        // (30 + 40 + 70 + 80) / 4 = 55
        assert_eq!(out, [55, 55, 55, 255]);
    }

    #[test]
    fn saturated_region_larger_than_u32_sums() {
        // 4200 * 4200 * 255 exceeds u32::MAX
        const SIDE: usize = 4200;
        let data = vec![u8::MAX; SIDE * SIDE];
        let info = SamplerInfo::new(0, 0, SIDE, SIDE, SIDE, 1, &data).unwrap();

        let mut scalar = [0u64; MAX_DATA_PER_PIXEL];
        let mut lanes = [0u64; MAX_DATA_PER_PIXEL];
        sum_scalar(&info, &mut scalar);
        sum_lanes(&info, &mut lanes);
        assert_eq!(scalar[0], (SIDE * SIDE) as u64 * 255);
        assert_eq!(lanes[0], scalar[0]);

        let mut out = [0u8; 1];
        AverageByteSampler.sample(&info, &mut out);
        assert_eq!(out, [u8::MAX]);
    }
}
