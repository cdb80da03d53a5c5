//! Floating point ARGB color model.
//!
//! Colors are plain `f32` channel values that are conceptually within `0..=1`
//! but are stored unclamped, so arithmetic may overshoot. Conversion to bytes
//! clamps. Equality is tolerance based to absorb round-trip error.

mod hex;
mod hsv;
mod ops;

use core::fmt;

pub use hex::ParseColorError;
pub use smart_leds::RGB8;

/// Maximum per-channel difference for two colors to compare equal.
///
/// Half a byte quantization step.
pub const TOLERANCE: f32 = 1.0 / 510.0;

/// Returns `true` if two channel values are equal within [`TOLERANCE`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    libm::fabsf(a - b) < TOLERANCE
}

/// ARGB color with `f32` channels.
///
/// This is a value type: every hand-off copies it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Color {
    a: f32,
    r: f32,
    g: f32,
    b: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::from_argb_f32(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb_f32(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb_f32(1.0, 1.0, 1.0);

    /// Create a color from float channels.
    pub const fn from_argb_f32(a: f32, r: f32, g: f32, b: f32) -> Self {
        Self { a, r, g, b }
    }

    /// Create an opaque color from float channels.
    pub const fn from_rgb_f32(r: f32, g: f32, b: f32) -> Self {
        Self::from_argb_f32(1.0, r, g, b)
    }

    /// Create a color from byte channels.
    pub fn from_argb_u8(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self::from_argb_f32(
            f32::from(a) / 255.0,
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Create an opaque color from byte channels.
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb_u8(u8::MAX, r, g, b)
    }

    pub const fn a(self) -> f32 {
        self.a
    }

    pub const fn r(self) -> f32 {
        self.r
    }

    pub const fn g(self) -> f32 {
        self.g
    }

    pub const fn b(self) -> f32 {
        self.b
    }

    /// Channels as `[a, r, g, b]`.
    pub const fn to_array(self) -> [f32; 4] {
        [self.a, self.r, self.g, self.b]
    }

    /// Convert to `(a, r, g, b)` bytes, rounding and clamping each channel.
    pub fn to_bytes(self) -> (u8, u8, u8, u8) {
        (
            channel_to_byte(self.a),
            channel_to_byte(self.r),
            channel_to_byte(self.g),
            channel_to_byte(self.b),
        )
    }

    /// Convert to an RGB strip color, dropping alpha.
    pub fn to_rgb8(self) -> RGB8 {
        let (_, r, g, b) = self.to_bytes();
        RGB8 { r, g, b }
    }

    /// Composite `overlay` over `self` ("over" operator).
    ///
    /// A transparent overlay returns `self` untouched and an opaque overlay
    /// returns `overlay` untouched.
    pub fn blend(self, overlay: Self) -> Self {
        if approx_eq(overlay.a, 0.0) {
            return self;
        }
        if approx_eq(overlay.a, 1.0) {
            return overlay;
        }

        let a = 1.0 - ((1.0 - overlay.a) * (1.0 - self.a));
        let base_weight = self.a * (1.0 - overlay.a);
        let mix = |base: f32, over: f32| ((over * overlay.a) / a) + ((base * base_weight) / a);

        Self::from_argb_f32(
            a,
            mix(self.r, overlay.r),
            mix(self.g, overlay.g),
            mix(self.b, overlay.b),
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_byte(value: f32) -> u8 {
    libm::roundf(value * 255.0).clamp(0.0, 255.0) as u8
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.a, other.a)
            && approx_eq(self.r, other.r)
            && approx_eq(self.g, other.g)
            && approx_eq(self.b, other.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, r, g, b) = self.to_bytes();
        write!(f, "[A: {a}, R: {r}, G: {g}, B: {b}]")
    }
}

impl From<RGB8> for Color {
    fn from(value: RGB8) -> Self {
        Self::from_rgb_u8(value.r, value.g, value.b)
    }
}

impl From<Color> for RGB8 {
    fn from(value: Color) -> Self {
        value.to_rgb8()
    }
}

impl From<smart_leds::hsv::Hsv> for Color {
    fn from(value: smart_leds::hsv::Hsv) -> Self {
        smart_leds::hsv::hsv2rgb(value).into()
    }
}
