//! Channel arithmetic on [`Color`].
//!
//! RGB operations leave the result unclamped. HSV operations wrap hue and clamp
//! saturation and value to `0..=1`.

use super::Color;

impl Color {
    #[must_use]
    pub fn add_rgb(self, r: f32, g: f32, b: f32) -> Self {
        Self::from_argb_f32(self.a, self.r + r, self.g + g, self.b + b)
    }

    #[must_use]
    pub fn subtract_rgb(self, r: f32, g: f32, b: f32) -> Self {
        Self::from_argb_f32(self.a, self.r - r, self.g - g, self.b - b)
    }

    #[must_use]
    pub fn multiply_rgb(self, r: f32, g: f32, b: f32) -> Self {
        Self::from_argb_f32(self.a, self.r * r, self.g * g, self.b * b)
    }

    /// Divide each RGB channel, a zero divisor leaves the channel untouched.
    #[must_use]
    pub fn divide_rgb(self, r: f32, g: f32, b: f32) -> Self {
        let div = |value: f32, divisor: f32| if divisor == 0.0 { value } else { value / divisor };
        Self::from_argb_f32(self.a, div(self.r, r), div(self.g, g), div(self.b, b))
    }

    #[must_use]
    pub fn set_rgb(self, r: Option<f32>, g: Option<f32>, b: Option<f32>) -> Self {
        Self::from_argb_f32(
            self.a,
            r.unwrap_or(self.r),
            g.unwrap_or(self.g),
            b.unwrap_or(self.b),
        )
    }

    #[must_use]
    pub fn add_alpha(self, a: f32) -> Self {
        Self::from_argb_f32(self.a + a, self.r, self.g, self.b)
    }

    #[must_use]
    pub fn multiply_alpha(self, factor: f32) -> Self {
        Self::from_argb_f32(self.a * factor, self.r, self.g, self.b)
    }

    #[must_use]
    pub fn set_alpha(self, a: f32) -> Self {
        Self::from_argb_f32(a, self.r, self.g, self.b)
    }

    #[must_use]
    pub fn add_hsv(self, hue: f32, saturation: f32, value: f32) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv_clamped(self.a, h + hue, s + saturation, v + value)
    }

    #[must_use]
    pub fn multiply_hsv(self, hue: f32, saturation: f32, value: f32) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv_clamped(self.a, h * hue, s * saturation, v * value)
    }

    #[must_use]
    pub fn set_hsv(self, hue: Option<f32>, saturation: Option<f32>, value: Option<f32>) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv_clamped(
            self.a,
            hue.unwrap_or(h),
            saturation.unwrap_or(s),
            value.unwrap_or(v),
        )
    }

    /// Scale the HSV value channel, keeping hue and saturation.
    #[must_use]
    pub fn scale_value(self, factor: f32) -> Self {
        self.multiply_hsv(1.0, 1.0, factor)
    }

    fn from_hsv_clamped(a: f32, hue: f32, saturation: f32, value: f32) -> Self {
        Self::from_hsv(a, hue, saturation.clamp(0.0, 1.0), value.clamp(0.0, 1.0))
    }
}
