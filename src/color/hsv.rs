//! HSV view of [`Color`].
//!
//! Hue is expressed in degrees (`0..360`), saturation and value in `0..=1`.

use super::Color;

impl Color {
    /// Hue in degrees.
    pub fn hue(self) -> f32 {
        self.to_hsv().0
    }

    /// HSV saturation.
    pub fn saturation(self) -> f32 {
        self.to_hsv().1
    }

    /// HSV value (what brushes call brightness).
    pub fn value(self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// Convert to `(hue, saturation, value)`.
    pub fn to_hsv(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;

        let saturation = if max <= 0.0 { 0.0 } else { delta / max };

        let hue = if delta <= 0.0 {
            0.0
        } else if max == self.r {
            60.0 * libm::fmodf((self.g - self.b) / delta, 6.0)
        } else if max == self.g {
            60.0 * (((self.b - self.r) / delta) + 2.0)
        } else {
            60.0 * (((self.r - self.g) / delta) + 4.0)
        };

        (wrap_hue(hue), saturation, max)
    }

    /// Create a color from alpha and HSV components.
    #[allow(clippy::cast_possible_truncation, clippy::many_single_char_names)]
    pub fn from_hsv(a: f32, hue: f32, saturation: f32, value: f32) -> Self {
        if saturation <= 0.0 {
            return Self::from_argb_f32(a, value, value, value);
        }

        let sector = wrap_hue(hue) / 60.0;
        let index = libm::floorf(sector);
        let fraction = sector - index;

        let p = value * (1.0 - saturation);
        let q = value * (1.0 - (saturation * fraction));
        let t = value * (1.0 - (saturation * (1.0 - fraction)));

        let (r, g, b) = match index as i32 {
            0 => (value, t, p),
            1 => (q, value, p),
            2 => (p, value, t),
            3 => (p, q, value),
            4 => (t, p, value),
            _ => (value, p, q),
        };
        Self::from_argb_f32(a, r, g, b)
    }
}

/// Wrap a hue into `0..360`.
pub(crate) fn wrap_hue(hue: f32) -> f32 {
    let wrapped = libm::fmodf(hue, 360.0);
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}
