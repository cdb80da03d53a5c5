use alloc::string::String;

use thiserror::Error;

use super::Color;

/// Error returned when parsing a hex color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("hex color must have 6 or 8 digits, got {0}")]
    InvalidLength(usize),
    #[error("hex color contains a non-hex digit")]
    InvalidDigit,
}

impl Color {
    /// Format as `#AARRGGBB`.
    pub fn to_hex(self) -> String {
        let (a, r, g, b) = self.to_bytes();
        alloc::format!("#{a:02X}{r:02X}{g:02X}{b:02X}")
    }

    /// Parse `RRGGBB` or `AARRGGBB`, with an optional leading `#`.
    pub fn from_hex(value: &str) -> Result<Self, ParseColorError> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ParseColorError::InvalidLength(digits.len()));
        }
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidDigit);
        }
        let raw = u32::from_str_radix(digits, 16).map_err(|_| ParseColorError::InvalidDigit)?;

        let [a, r, g, b] = raw.to_be_bytes();
        if digits.len() == 6 {
            // The high byte is always zero for 6 digits
            Ok(Self::from_rgb_u8(r, g, b))
        } else {
            Ok(Self::from_argb_u8(a, r, g, b))
        }
    }
}

impl core::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
